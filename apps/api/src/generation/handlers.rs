//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::generation::generator::{generate_message, generate_viral_post, GenerateMessageRequest};
use crate::models::message::Message;
use crate::models::post::GeneratedPost;
use crate::state::AppState;

/// POST /api/messages/generate
///
/// Generates a personalized outreach message with the selected provider and
/// stores it as a draft.
pub async fn handle_generate_message(
    State(state): State<AppState>,
    Json(request): Json<GenerateMessageRequest>,
) -> Result<Json<Message>, AppError> {
    if request.target_id.trim().is_empty() {
        return Err(AppError::Validation("target_id cannot be empty".to_string()));
    }

    let message = generate_message(state.store.as_ref(), state.llm.as_ref(), request).await?;
    Ok(Json(message))
}

/// POST /api/generate-post
///
/// Synthesizes a draft post from the top reference posts.
pub async fn handle_generate_post(
    State(state): State<AppState>,
) -> Result<Json<GeneratedPost>, AppError> {
    let post = generate_viral_post(state.store.as_ref(), state.llm.as_ref()).await?;
    Ok(Json(post))
}
