// Metrics endpoint

use crate::core::error::MonitoringError;
use crate::core::state::AppState;
use crate::models::admin::ApiKeyQuery;
use crate::utils::auth::authorize;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::warn;

/// Returns JSON with removal statistics:
/// - Passes run, passes that reached candidates, passes that failed to list torrents
/// - Torrents removed, removal failures, candidates spared by thresholds
/// - Ignore entries held, last pass time and uptime
pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
) -> Result<Response, MonitoringError> {
    if !authorize(params.api_key.as_deref(), state.admin_key()) {
        warn!("Unauthorized metrics access attempt");
        return Err(MonitoringError::InvalidApiKey);
    }

    let snapshot = state.metrics.get_snapshot(&state.ignore_store);

    Ok((StatusCode::OK, Json(snapshot)).into_response())
}
