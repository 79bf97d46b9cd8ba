use crate::models::admin::ErrorResponse;
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use tracing::debug;

pub async fn fallback_handler(uri: Uri) -> Response {
    debug!(path = %uri.path(), "Request for unknown endpoint");

    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: "Invalid endpoint. Valid endpoints: /config, /rules, /ignore, /run, /metrics, /health"
                .to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_handler() {
        let response = fallback_handler(Uri::from_static("/announce")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
