// Centralized error handling for the retention service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised while validating a policy document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("Unknown ranking criterion '{0}'. Must be one of: ratio, date_added, seed_time")]
    UnknownRankCriterion(String),

    #[error("Unknown combination rule '{0}'. Must be one of: and, or")]
    UnknownCombinator(String),

    #[error("Invalid value for '{key}': expected {expected}")]
    InvalidField { key: String, expected: &'static str },

    #[error("Invalid value for '{key}': {reason}")]
    OutOfRange { key: String, reason: String },
}

/// Errors raised while applying a policy update
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error(transparent)]
    Invalid(#[from] PolicyError),

    #[error("Failed to persist policy: {0:#}")]
    Persist(anyhow::Error),
}

/// Errors returned by a torrent engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Torrent engine returned error status: {0}")]
    Status(u16),

    #[error("Torrent not found: {0}")]
    NotFound(String),

    #[error("Torrent engine rejected the request: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    InvalidPolicy(#[from] PolicyError),

    #[error("Failed to persist state: {0}")]
    PersistError(String),
}

impl From<UpdateError> for AdminError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::Invalid(e) => AdminError::InvalidPolicy(e),
            UpdateError::Persist(e) => AdminError::PersistError(format!("{:#}", e)),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        use crate::models::admin::ErrorResponse;
        use axum::response::Json;

        let status = match &self {
            AdminError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AdminError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AdminError::InvalidPolicy(_) => StatusCode::BAD_REQUEST,
            AdminError::PersistError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Invalid API key")]
    InvalidApiKey,
}

impl IntoResponse for MonitoringError {
    fn into_response(self) -> Response {
        match self {
            MonitoringError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        }
    }
}
