//! Expert chat handler

use axum::{extract::State, Extension, Json};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::chat::{ChatInput, ChatReply};
use crate::AppState;

/// Ask the agricultural expert, optionally about one of the caller's reports
pub async fn ask_expert(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ChatInput>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = state.chat_service().ask(user.user_id, input).await?;
    Ok(Json(reply))
}
