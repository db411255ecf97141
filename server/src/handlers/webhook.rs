//! Inbound webhook handler.
//!
//! External systems inject data into the message store here: either a new
//! contact message or a delivery-state update selected by message id or
//! correlation id. Malformed payloads are rejected whole; there is no
//! partial application.

use axum::{extract::State, Json};
use serde_json::json;
use crate::{
    error::{AppError, Result},
    models::{DeliveryStatus, Direction, MessageKind, NewMessage, WebhookPayload},
    AppState,
};

pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<serde_json::Value>> {
    if payload.event.as_deref() == Some("message") {
        let (Some(conversation_id), Some(text)) = (payload.conversation_id, payload.text) else {
            return Err(AppError::BadRequest(
                "message payload requires conversation_id and text".to_string(),
            ));
        };

        let draft = NewMessage {
            conversation_id,
            text,
            timestamp: payload.timestamp,
            kind: MessageKind::Text,
            direction: Direction::Contact,
            status: DeliveryStatus::Delivered,
            correlation_id: payload.correlation_id,
        };

        state.storage.append_message(draft).await?;
    } else if let Some(status) = payload.status {
        let updated = apply_status_update(&state, status, payload.id, payload.correlation_id).await?;
        if updated == 0 {
            tracing::debug!("Status update matched no stored message");
        }
    } else {
        return Err(AppError::BadRequest(
            "payload is neither a message nor a status update".to_string(),
        ));
    }

    Ok(Json(json!({ "success": true })))
}

async fn apply_status_update(
    state: &AppState,
    status: DeliveryStatus,
    id: Option<String>,
    correlation_id: Option<String>,
) -> Result<u64> {
    // Message id wins over correlation id when both are present.
    if let Some(id) = id {
        return Ok(state.storage.update_status_by_id(&id, status).await?);
    }
    if let Some(correlation_id) = correlation_id {
        return Ok(state
            .storage
            .update_status_by_correlation(&correlation_id, status)
            .await?);
    }

    Err(AppError::BadRequest(
        "status update requires id or correlation_id".to_string(),
    ))
}
