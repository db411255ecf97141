//! Optimistic messaging flow.
//!
//! The one place genuine design tension lives: the UI must feel
//! instantaneous while the authoritative record is still in flight. A send
//! appears in the session immediately under a placeholder identifier, the
//! store is asked to persist it, and the placeholder entry is then either
//! replaced by the persisted record or removed without a trace. Text-only
//! sends additionally schedule a simulated contact reply, which runs the
//! same optimistic pattern in the contact direction.

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::clock::Clock;
use crate::notify::NotificationChannel;
use crate::replies;
use crate::state::{
    DeliveryStatus, Direction, Message, MessageKind, NewMessage, SessionState,
};

#[derive(Debug, Error)]
pub enum SendError {
    #[error("no conversation selected")]
    NoSelection,

    #[error("nothing to send")]
    EmptyDraft,
}

/// What became of a submitted message. A discarded send leaves no trace in
/// the session and no user-facing error; that weak-but-deliberate failure
/// mode is part of the contract.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    Persisted(Message),
    Discarded,
}

/// A simulated reply waiting for its delay to elapse. The caller owns the
/// sleep; tests can deliver immediately.
#[derive(Debug, Clone)]
pub struct ReplyTask {
    pub conversation_id: String,
    pub conversation_name: String,
    pub prompt: String,
    pub delay: Duration,
}

/// Descriptor for a file attached to a send.
#[derive(Debug, Clone)]
pub struct AttachmentInfo {
    pub file_name: String,
    pub mime_type: String,
}

impl AttachmentInfo {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Self { file_name, mime_type }
    }

    /// Message kind from the attachment's media category.
    pub fn kind(&self) -> MessageKind {
        if self.mime_type.starts_with("image/") {
            MessageKind::Image
        } else if self.mime_type.starts_with("audio/") {
            MessageKind::Audio
        } else if self.mime_type.starts_with("video/") {
            MessageKind::Video
        } else {
            MessageKind::Document
        }
    }

    pub fn caption(&self) -> String {
        format!("📎 {}", self.file_name)
    }
}

/// Build the outgoing draft for the active conversation: text kind unless a
/// file rides along, caption synthesized when the text is empty.
fn compose_draft(
    state: &SessionState,
    text: &str,
    attachment: Option<&AttachmentInfo>,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Result<NewMessage, SendError> {
    let conversation_id = state
        .active_conversation()
        .ok_or(SendError::NoSelection)?
        .to_string();

    if text.trim().is_empty() && attachment.is_none() {
        return Err(SendError::EmptyDraft);
    }

    let (kind, body) = match attachment {
        Some(att) => {
            let body = if text.trim().is_empty() {
                att.caption()
            } else {
                text.to_string()
            };
            (att.kind(), body)
        }
        None => (MessageKind::Text, text.to_string()),
    };

    Ok(NewMessage {
        conversation_id,
        text: body,
        timestamp: Some(timestamp),
        kind,
        direction: Direction::User,
        status: DeliveryStatus::Sent,
        correlation_id: None,
    })
}

pub struct Messenger<C: Clock, R: Rng> {
    api: ApiClient,
    channel: Box<dyn NotificationChannel>,
    clock: C,
    rng: R,
}

impl<C: Clock, R: Rng> Messenger<C, R> {
    pub fn new(api: ApiClient, channel: Box<dyn NotificationChannel>, clock: C, rng: R) -> Self {
        Self { api, channel, clock, rng }
    }

    /// Submit a user-composed message for the active conversation.
    ///
    /// The optimistic entry is visible before the persist call is issued and
    /// never blocks on it. On success the entry is reconciled in place and
    /// the persisted message announced on the notification channel; on
    /// failure it is removed outright. Text-only sends return a `ReplyTask`
    /// whose delay the caller waits out before calling [`deliver_reply`].
    ///
    /// [`deliver_reply`]: Messenger::deliver_reply
    pub async fn send(
        &mut self,
        state: &mut SessionState,
        text: &str,
        attachment: Option<AttachmentInfo>,
    ) -> Result<(SendOutcome, Option<ReplyTask>), SendError> {
        let draft = compose_draft(state, text, attachment.as_ref(), self.clock.now())?;
        let conversation_id = draft.conversation_id.clone();

        let temp_id = format!("temp-{}", Uuid::new_v4());
        state.push_optimistic(draft.clone().into_message(temp_id.clone()));

        match self.api.append_message(&draft).await {
            Ok(persisted) => {
                state.resolve_pending(&temp_id, persisted.clone());
                self.channel.announce(&persisted);

                let reply = if attachment.is_none() {
                    Some(self.schedule_reply(state, &conversation_id, text))
                } else {
                    None
                };

                Ok((SendOutcome::Persisted(persisted), reply))
            }
            Err(e) => {
                tracing::warn!("Persist failed, dropping optimistic entry: {}", e);
                state.reject_pending(&temp_id);
                Ok((SendOutcome::Discarded, None))
            }
        }
    }

    fn schedule_reply(
        &mut self,
        state: &SessionState,
        conversation_id: &str,
        prompt: &str,
    ) -> ReplyTask {
        let conversation_name = state
            .conversations()
            .iter()
            .find(|c| c.conversation_id == conversation_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("Contact {}", conversation_id));

        ReplyTask {
            conversation_id: conversation_id.to_string(),
            conversation_name,
            prompt: prompt.to_string(),
            delay: replies::reply_delay(&mut self.rng),
        }
    }

    /// Deliver a scheduled simulated reply: same optimistic append, persist,
    /// reconcile-or-rollback cycle as a user send, in the contact direction
    /// with delivered status.
    pub async fn deliver_reply(
        &mut self,
        state: &mut SessionState,
        task: &ReplyTask,
    ) -> SendOutcome {
        let text = replies::pick_reply(
            &task.prompt,
            &task.conversation_name,
            self.clock.now(),
            &mut self.rng,
        );

        let draft = NewMessage {
            conversation_id: task.conversation_id.clone(),
            text: text.to_string(),
            timestamp: Some(self.clock.now()),
            kind: MessageKind::Text,
            direction: Direction::Contact,
            status: DeliveryStatus::Delivered,
            correlation_id: None,
        };

        let temp_id = format!("reply-{}", Uuid::new_v4());
        state.push_optimistic(draft.clone().into_message(temp_id.clone()));

        match self.api.append_message(&draft).await {
            Ok(persisted) => {
                state.resolve_pending(&temp_id, persisted.clone());
                SendOutcome::Persisted(persisted)
            }
            Err(e) => {
                tracing::warn!("Reply persist failed, dropping optimistic entry: {}", e);
                state.reject_pending(&temp_id);
                SendOutcome::Discarded
            }
        }
    }
}
