//! Conversation list handler

use axum::{extract::State, Json};
use crate::{models::ConversationSummary, AppState};

/// List conversation summaries, newest first. A failing store degrades to an
/// empty list; callers cannot tell it apart from a store with no
/// conversations, and the wire never carries the distinction.
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Json<Vec<ConversationSummary>> {
    match state.storage.list_conversations().await {
        Ok(summaries) => Json(summaries),
        Err(e) => {
            tracing::error!("Failed to list conversations: {:?}", e);
            Json(Vec::new())
        }
    }
}
