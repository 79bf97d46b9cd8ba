use crate::core::error::AdminError;
use crate::core::state::AppState;
use crate::models::admin::ApiKeyQuery;
use crate::policy::remover::PassReport;
use crate::utils::auth::authorize;
use axum::{
    extract::{Query, State},
    response::Json,
};
use std::sync::Arc;
use tracing::{info, warn};

/// POST /run
///
/// Runs a removal pass immediately and waits for it. A pass already in
/// progress finishes first.
pub async fn run_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
) -> Result<Json<PassReport>, AdminError> {
    if !authorize(params.api_key.as_deref(), state.admin_key()) {
        warn!("Unauthorized manual run attempt");
        return Err(AdminError::InvalidApiKey);
    }

    info!("Manual removal pass requested");

    Ok(Json(state.service.run_now().await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_support::{create_test_state, TEST_API_KEY};
    use crate::models::torrent::TorrentView;
    use serde_json::json;

    fn key() -> Query<ApiKeyQuery> {
        Query(ApiKeyQuery {
            api_key: Some(TEST_API_KEY.to_string()),
        })
    }

    #[tokio::test]
    async fn test_run_handler_with_unlimited_policy() {
        let (_temp_dir, engine, state) = create_test_state(vec![TorrentView::new("a", true, 5.0, 0, 0)]);

        let Json(report) = run_handler(State(state), key()).await.unwrap();

        assert!(report.removed.is_empty());
        assert!(engine.removed().is_empty());
    }

    #[tokio::test]
    async fn test_run_handler_dry_run_keeps_torrents() {
        let (_temp_dir, engine, state) = create_test_state(vec![
            TorrentView::new("a", true, 0.5, 0, 0),
            TorrentView::new("b", true, 3.0, 0, 0),
        ]);
        let partial = json!({"max_seeds": 1, "dry_run": true});
        state.policy_store.merge(partial.as_object().unwrap()).unwrap();

        let Json(report) = run_handler(State(state), key()).await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.decision.unwrap().removals.len(), 1);
        assert!(engine.removed().is_empty());
        assert_eq!(engine.len(), 2);
    }
}
