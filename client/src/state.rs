//! Client session state.
//!
//! `SessionState` is the single in-memory source of truth for the signed-in
//! user, the conversation list, the active selection, and the loaded message
//! sequence. It is a single-owner container with explicit mutation methods;
//! all mutations run synchronously between suspension points, so no locking
//! exists or is needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Audio,
    Video,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    User,
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

/// A message as held in the session, persisted or optimistic. Optimistic
/// entries carry a `temp-` or `reply-` prefixed identifier until the store
/// confirms them; server-assigned identifiers never use those prefixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub direction: Direction,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// A draft submitted to the store. The store assigns the identifier and,
/// when absent, the timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub conversation_id: String,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: MessageKind,
    pub direction: Direction,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl NewMessage {
    /// Materialize the draft under a placeholder identifier for optimistic
    /// display.
    pub fn into_message(self, id: String) -> Message {
        Message {
            id,
            conversation_id: self.conversation_id,
            text: self.text,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            kind: self.kind,
            direction: self.direction,
            status: self.status,
            correlation_id: self.correlation_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    pub name: String,
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub unread_count: i64,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_muted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub avatar: Option<String>,
    pub is_online: bool,
}

// ============================================================================
// Session State
// ============================================================================

#[derive(Debug, Default)]
pub struct SessionState {
    user: Option<LocalUser>,
    conversations: Vec<Conversation>,
    active_conversation: Option<String>,
    messages: Vec<Message>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a previously established session.
    pub fn restore(user: LocalUser) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }

    pub fn user(&self) -> Option<&LocalUser> {
        self.user.as_ref()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_conversation(&self) -> Option<&str> {
        self.active_conversation.as_deref()
    }

    /// The loaded message sequence. Always corresponds to the active
    /// conversation.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Establish the session from a phone number. The display name is
    /// synthesized from the last four digits; the caller follows up with a
    /// conversation-list load.
    pub fn login(&mut self, phone_number: &str) -> &LocalUser {
        let tail: String = {
            let digits: Vec<char> = phone_number.chars().collect();
            digits[digits.len().saturating_sub(4)..].iter().collect()
        };

        self.conversations.clear();
        self.active_conversation = None;
        self.messages.clear();

        self.user.insert(LocalUser {
            id: uuid::Uuid::new_v4().to_string(),
            name: format!("User {}", tail),
            phone_number: phone_number.to_string(),
            avatar: None,
            is_online: true,
        })
    }

    /// Back to the unauthenticated initial state.
    pub fn logout(&mut self) {
        self.user = None;
        self.conversations.clear();
        self.active_conversation = None;
        self.messages.clear();
    }

    /// Make a conversation the active selection. Its unread counter drops to
    /// zero in the same call, with no server round-trip; the stale message
    /// sequence is cleared so the view never shows another conversation's
    /// messages while the load is in flight.
    pub fn select_conversation(&mut self, conversation_id: &str) {
        self.active_conversation = Some(conversation_id.to_string());
        self.messages.clear();

        if let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| c.conversation_id == conversation_id)
        {
            conv.unread_count = 0;
        }
    }

    /// Wholesale replace of the conversation list from a list response.
    pub fn set_conversations(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
    }

    /// Wholesale replace of the message sequence from a load response.
    /// A response for a conversation that is no longer the active selection
    /// is stale and dropped. Returns whether the messages were installed.
    pub fn install_messages(&mut self, conversation_id: &str, messages: Vec<Message>) -> bool {
        if self.active_conversation.as_deref() != Some(conversation_id) {
            return false;
        }
        self.messages = messages;
        true
    }

    // ========================================================================
    // Optimistic Entries
    // ========================================================================

    /// Append an optimistic entry and refresh the owning conversation's
    /// summary snapshot. Runs before any network interaction completes. The
    /// entry joins the visible sequence only while its conversation is the
    /// active selection; a simulated reply that fires after the user moved
    /// on still lands in the summary.
    pub fn push_optimistic(&mut self, message: Message) {
        self.touch_summary(&message);
        if self.active_conversation.as_deref() == Some(message.conversation_id.as_str()) {
            self.messages.push(message);
        }
    }

    /// Replace the optimistic entry with its persisted counterpart, matched
    /// by placeholder identifier. Position and body stay put, the identifier
    /// changes. Returns whether a replace happened.
    pub fn resolve_pending(&mut self, temp_id: &str, persisted: Message) -> bool {
        match self.messages.iter_mut().find(|m| m.id == temp_id) {
            Some(slot) => {
                *slot = persisted;
                true
            }
            None => false,
        }
    }

    /// Drop an optimistic entry whose persist failed. The entry disappears
    /// without a trace; there is no failed-state marker and no retry.
    pub fn reject_pending(&mut self, temp_id: &str) {
        self.messages.retain(|m| m.id != temp_id);
    }

    // ========================================================================
    // Server-Originated Updates
    // ========================================================================

    /// Apply a message that arrived from outside the local send flow (the
    /// notification channel, or a webhook surfaced through it). It joins the
    /// visible sequence only when its conversation is the active selection;
    /// the summary snapshot and unread counter update either way.
    pub fn apply_inbound(&mut self, message: Message) {
        self.touch_summary(&message);

        if self.active_conversation.as_deref() == Some(message.conversation_id.as_str()) {
            self.messages.push(message);
        }
    }

    /// Delivery-state update for a persisted message, matched by identifier.
    pub fn apply_status(&mut self, id: &str, status: DeliveryStatus) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            message.status = status;
        }
    }

    /// Refresh a conversation's last-message snapshot, creating the summary
    /// when the conversation is not in the list yet. The unread counter
    /// moves only for contact-direction messages in conversations other than
    /// the active selection.
    fn touch_summary(&mut self, message: &Message) {
        let is_active =
            self.active_conversation.as_deref() == Some(message.conversation_id.as_str());
        let counts_as_unread = message.direction == Direction::Contact && !is_active;

        match self
            .conversations
            .iter_mut()
            .find(|c| c.conversation_id == message.conversation_id)
        {
            Some(conv) => {
                conv.last_message = Some(message.text.clone());
                conv.last_message_time = Some(message.timestamp);
                if counts_as_unread {
                    conv.unread_count += 1;
                }
            }
            None => {
                self.conversations.push(Conversation {
                    conversation_id: message.conversation_id.clone(),
                    name: format!("Contact {}", message.conversation_id),
                    last_message: Some(message.text.clone()),
                    last_message_time: Some(message.timestamp),
                    unread_count: if counts_as_unread { 1 } else { 0 },
                    is_pinned: false,
                    is_muted: false,
                });
            }
        }
    }
}
