// src/api/error.rs
// HTTP error responses: every failure renders as {"detail": "..."}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::analysis::AnalysisError;
use crate::fix::FixError;

#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(json!({ "detail": self.message }))).into_response()
    }
}

impl From<FixError> for ApiError {
    fn from(e: FixError) -> Self {
        error!("Error during AI stream: {}", e);
        ApiError::internal(format!("AI code fixing failed: {}", e))
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        error!("Static analysis error: {}", e);
        ApiError::internal(format!("Static analysis failed: {}", e))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
