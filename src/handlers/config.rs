use crate::core::error::AdminError;
use crate::core::state::AppState;
use crate::models::admin::ApiKeyQuery;
use crate::models::policy::PolicyDocument;
use crate::utils::auth::authorize;
use axum::{
    extract::{Query, State},
    response::Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

fn check_key(state: &AppState, params: &ApiKeyQuery, endpoint: &str) -> Result<(), AdminError> {
    if !authorize(params.api_key.as_deref(), state.admin_key()) {
        warn!(endpoint = endpoint, "Unauthorized policy access attempt");
        return Err(AdminError::InvalidApiKey);
    }
    Ok(())
}

/// GET /config
pub async fn get_config_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
) -> Result<Json<PolicyDocument>, AdminError> {
    check_key(&state, &params, "/config")?;

    Ok(Json(state.service.get_config()))
}

/// POST /config
///
/// Merges the JSON body into the stored policy and returns the full updated document.
pub async fn set_config_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
    Json(partial): Json<PolicyDocument>,
) -> Result<Json<PolicyDocument>, AdminError> {
    check_key(&state, &params, "/config")?;

    let keys: Vec<&str> = partial.keys().map(String::as_str).collect();
    info!(keys = ?keys, "Policy update requested");

    state.service.set_config(&partial)?;

    Ok(Json(state.service.get_config()))
}

/// GET /rules
pub async fn get_rules_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
) -> Result<Json<BTreeMap<&'static str, &'static str>>, AdminError> {
    check_key(&state, &params, "/rules")?;

    Ok(Json(state.service.get_remove_rules()))
}
