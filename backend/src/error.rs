//! Error handling for the Crop Advisory Platform
//!
//! Every error leaves the API as `{ "error": { code, message, field?, stage? } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::PipelineStage;
use thiserror::Error;

use crate::external::ServiceError;
use crate::repository::RepositoryError;
use crate::services::onboarding::OnboardingError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Onboarding pipeline errors
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),

    // External service errors
    #[error("Expert chat {0}")]
    ExpertChat(ServiceError),

    // Storage errors
    #[error("Storage error: {0}")]
    Repository(#[from] RepositoryError),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            stage: None,
        }
    }
}

fn onboarding_response(err: &OnboardingError) -> (StatusCode, ErrorDetail) {
    let stage = err.stage();
    let (status, code) = match err {
        OnboardingError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        OnboardingError::Persist(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PERSIST_ERROR"),
        _ if err.is_timeout() => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
        OnboardingError::Predict(_) => (StatusCode::BAD_GATEWAY, "PREDICT_ERROR"),
        OnboardingError::Forecast(_) => (StatusCode::BAD_GATEWAY, "FORECAST_ERROR"),
        OnboardingError::Risk(_) => (StatusCode::BAD_GATEWAY, "RISK_ERROR"),
    };
    let field = match err {
        OnboardingError::Validation { field, .. } => Some(field.clone()),
        _ => None,
    };

    (
        status,
        ErrorDetail {
            code: code.to_string(),
            message: err.to_string(),
            field,
            stage: Some(stage),
        },
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid credentials"),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("TOKEN_EXPIRED", "Token has expired"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Token is invalid"),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone()),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::Onboarding(err) => onboarding_response(err),
            AppError::ExpertChat(err) => {
                let (status, code) = if matches!(err, ServiceError::Timeout { .. }) {
                    (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT")
                } else {
                    (StatusCode::BAD_GATEWAY, "EXPERT_CHAT_ERROR")
                };
                (status, ErrorDetail::new(code, self.to_string()))
            }
            AppError::Repository(RepositoryError::NotFound { entity, .. }) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", entity)),
            ),
            AppError::Repository(RepositoryError::Conflict(what)) => (
                StatusCode::CONFLICT,
                ErrorDetail::new("CONFLICT", format!("{} already exists", what)),
            ),
            AppError::Repository(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
