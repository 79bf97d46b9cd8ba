// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(crate::handlers::health::health_handler))

        // Policy endpoints (require API key when configured)
        .route(
            "/config",
            get(crate::handlers::config::get_config_handler).post(crate::handlers::config::set_config_handler),
        )
        .route("/rules", get(crate::handlers::config::get_rules_handler))
        .route(
            "/ignore",
            get(crate::handlers::ignore::get_ignore_handler).post(crate::handlers::ignore::set_ignore_handler),
        )
        .route("/run", post(crate::handlers::run::run_handler))
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_support::{create_test_state, TEST_API_KEY};
    use crate::models::torrent::TorrentView;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (_temp_dir, _engine, state) = create_test_state(Vec::new());

        let response = build_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_config_requires_api_key() {
        let (_temp_dir, _engine, state) = create_test_state(Vec::new());

        let response = build_router(state)
            .oneshot(Request::get("/config").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_post_config_then_get() {
        let (_temp_dir, _engine, state) = create_test_state(Vec::new());
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/config?api_key={}", TEST_API_KEY))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"max_seeds": 10, "filter": "seed_time"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get(format!("/config?api_key={}", TEST_API_KEY))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let config = body_json(response).await;

        assert_eq!(config["max_seeds"], json!(10));
        assert_eq!(config["filter"], json!("seed_time"));
        assert!(state.trigger.is_running());
        state.trigger.stop();
    }

    #[tokio::test]
    async fn test_run_endpoint_removes_over_limit() {
        let (_temp_dir, engine, state) = create_test_state(vec![
            TorrentView::new("a", true, 0.5, 0, 0),
            TorrentView::new("b", true, 3.0, 0, 0),
        ]);
        let mut partial = serde_json::Map::new();
        partial.insert("max_seeds".to_string(), json!(1));
        state.policy_store.merge(&partial).unwrap();

        let response = build_router(state)
            .oneshot(
                Request::post(format!("/run?api_key={}", TEST_API_KEY))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report = body_json(response).await;
        assert_eq!(report["removed"], json!(["b"]));
        assert_eq!(engine.removed_ids(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_post_ignore_without_flag_ignores() {
        let (_temp_dir, _engine, state) = create_test_state(Vec::new());
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/ignore?api_key={}", TEST_API_KEY))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"ids": "a"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get(format!("/ignore?api_key={}&ids=a", TEST_API_KEY))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;

        assert_eq!(body["ignored"], json!([true]));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (_temp_dir, _engine, state) = create_test_state(Vec::new());

        let response = build_router(state)
            .oneshot(Request::get("/announce").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
