//! Direct message records. Generated messages are created by `generation`.

use tracing::info;

use crate::errors::AppError;
use crate::models::message::{Message, NewMessage};
use crate::store::{find_records, insert_record, Collection, DocumentStore, Filter, MAX_LIST_RESULTS};
use crate::targets::get_target;

pub mod handlers;

/// Stores a hand-written message as a draft. The referenced target must exist.
pub async fn create_message(
    store: &dyn DocumentStore,
    input: NewMessage,
) -> Result<Message, AppError> {
    if input.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    let target = get_target(store, &input.target_id).await?;

    let message = Message::draft(target.id, input.content, input.message_type);
    insert_record(store, Collection::Messages, &message).await?;

    info!("Created {} message {}", message.message_type, message.id);
    Ok(message)
}

pub async fn list_messages(store: &dyn DocumentStore) -> Result<Vec<Message>, AppError> {
    let messages = find_records(
        store,
        Collection::Messages,
        &Filter::all(),
        None,
        Some(MAX_LIST_RESULTS),
    )
    .await?;
    Ok(messages)
}
