use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::db::StoreError;
use crate::models::MessageResponse;

/// Errors surfaced at the request boundary
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, mis-typed or unknown request argument
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = %status, "Request rejected: {}", self);

        let body = Json(MessageResponse {
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Environment configuration could not be parsed
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not in the correct format: {value}")]
    Invalid { var: &'static str, value: String },
}

/// The startup dataset could not be loaded
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dataset {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dataset row {index} ({player}) has a non-finite float value")]
    InvalidRow { index: usize, player: String },
}
