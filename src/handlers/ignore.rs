use crate::core::error::AdminError;
use crate::core::state::AppState;
use crate::models::admin::{ApiKeyQuery, IgnoreQuery, IgnoreResponse, SetIgnoreRequest, SuccessResponse};
use crate::utils::auth::authorize;
use axum::{
    extract::{Query, State},
    response::Json,
};
use std::sync::Arc;
use tracing::{info, warn};

/// GET /ignore?ids=a,b
pub async fn get_ignore_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IgnoreQuery>,
) -> Result<Json<IgnoreResponse>, AdminError> {
    if !authorize(params.api_key.as_deref(), state.admin_key()) {
        warn!("Unauthorized ignore lookup attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let ids = params.ids();
    if ids.is_empty() {
        return Err(AdminError::InvalidParameter("ids must name at least one torrent".to_string()));
    }

    Ok(Json(IgnoreResponse {
        success: true,
        ignored: state.service.get_ignore(&ids),
    }))
}

/// POST /ignore
pub async fn set_ignore_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
    Json(request): Json<SetIgnoreRequest>,
) -> Result<Json<SuccessResponse>, AdminError> {
    if !authorize(params.api_key.as_deref(), state.admin_key()) {
        warn!("Unauthorized ignore update attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let ignore = request.ignore;
    let ids = request.ids.into_vec();
    if ids.is_empty() {
        return Err(AdminError::InvalidParameter("ids must name at least one torrent".to_string()));
    }

    state.service.set_ignore(&ids, ignore)?;

    info!(count = ids.len(), ignore = ignore, "Ignore flags updated");

    Ok(Json(SuccessResponse {
        success: true,
        message: format!("{} torrent(s) {}", ids.len(), if ignore { "ignored" } else { "unignored" }),
    }))
}
