//! Authentication handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use shared::User;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::auth::{AuthSession, RegisterInput};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthSession>), AppError> {
    let session = state.auth_service().register(body).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthSession>, AppError> {
    let session = state
        .auth_service()
        .login(&body.email, &body.password)
        .await?;
    Ok(Json(session))
}

/// Current user endpoint handler
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    let account = state.auth_service().me(user.user_id).await?;
    Ok(Json(account))
}
