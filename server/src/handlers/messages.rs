//! Message handlers

use axum::{
    extract::{Path, State},
    Json,
};
use crate::{
    error::{AppError, Result},
    models::{Message, NewMessage},
    AppState,
};

/// Messages for one conversation, ascending by timestamp. Same degradation
/// policy as the conversation list: store trouble yields an empty sequence.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Json<Vec<Message>> {
    match state.storage.list_messages(&conversation_id).await {
        Ok(messages) => Json(messages),
        Err(e) => {
            tracing::error!("Failed to list messages for {}: {:?}", conversation_id, e);
            Json(Vec::new())
        }
    }
}

/// Persist a message draft and return the stored record. Text may be empty:
/// attachment captions are synthesized client-side and the store stays
/// lenient about bodies.
pub async fn create_message(
    State(state): State<AppState>,
    Json(draft): Json<NewMessage>,
) -> Result<Json<Message>> {
    if draft.text.len() > state.config.limits.max_text_len {
        return Err(AppError::BadRequest(format!(
            "text exceeds {} bytes",
            state.config.limits.max_text_len
        )));
    }

    let saved = state.storage.append_message(draft).await?;

    Ok(Json(saved))
}
