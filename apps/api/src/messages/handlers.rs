use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::messages::{create_message, list_messages};
use crate::models::message::{Message, NewMessage};
use crate::state::AppState;

/// POST /api/messages
pub async fn handle_create_message(
    State(state): State<AppState>,
    Json(input): Json<NewMessage>,
) -> Result<Json<Message>, AppError> {
    Ok(Json(create_message(state.store.as_ref(), input).await?))
}

/// GET /api/messages
pub async fn handle_list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(list_messages(state.store.as_ref()).await?))
}
