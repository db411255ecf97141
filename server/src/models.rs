//! Data models for the parlor server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Message Models
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

impl ToString for MessageKind {
    fn to_string(&self) -> String {
        match self {
            MessageKind::Text => "text".to_string(),
            MessageKind::Image => "image".to_string(),
            MessageKind::Audio => "audio".to_string(),
            MessageKind::Video => "video".to_string(),
            MessageKind::Document => "document".to_string(),
        }
    }
}

impl From<String> for MessageKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => MessageKind::Text,
            "image" => MessageKind::Image,
            "audio" => MessageKind::Audio,
            "video" => MessageKind::Video,
            "document" => MessageKind::Document,
            _ => MessageKind::Text,
        }
    }
}

/// Who produced a message: the signed-in user or the remote contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    User,
    Contact,
}

impl ToString for Direction {
    fn to_string(&self) -> String {
        match self {
            Direction::User => "user".to_string(),
            Direction::Contact => "contact".to_string(),
        }
    }
}

impl From<String> for Direction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "contact" => Direction::Contact,
            _ => Direction::User,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

impl ToString for DeliveryStatus {
    fn to_string(&self) -> String {
        match self {
            DeliveryStatus::Sent => "sent".to_string(),
            DeliveryStatus::Delivered => "delivered".to_string(),
            DeliveryStatus::Read => "read".to_string(),
        }
    }
}

impl From<String> for DeliveryStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "delivered" => DeliveryStatus::Delivered,
            "read" => DeliveryStatus::Read,
            _ => DeliveryStatus::Sent,
        }
    }
}

/// A persisted message as returned over the wire.
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

/// A message draft submitted for persistence. The store assigns the id and,
/// when absent, the timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub conversation_id: String,
    /// May be empty; attachment captions are synthesized client-side and
    /// the store does not validate bodies.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: MessageKind,
    pub direction: Direction,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Raw message row. Timestamps are stored as RFC 3339 text so that the
/// store's ordering is the lexicographic order of the column.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredMessage {
    pub id: String,
    pub conversation_id: String,
    pub text: String,
    pub timestamp: String,
    pub kind: String,
    pub direction: String,
    pub status: String,
    pub correlation_id: Option<String>,
}

impl From<StoredMessage> for Message {
    fn from(row: StoredMessage) -> Self {
        Self {
            id: row.id,
            conversation_id: row.conversation_id,
            text: row.text,
            timestamp: parse_timestamp(&row.timestamp),
            kind: row.kind.into(),
            direction: row.direction.into(),
            status: row.status.into(),
            correlation_id: row.correlation_id,
        }
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to now for rows written
/// by foreign tooling.
pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// ============================================================================
// Conversation Models
// ============================================================================

/// Display-oriented aggregate of a conversation's latest state. Derived from
/// the message collection, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
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

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SummaryRow {
    pub conversation_id: String,
    pub last_message: String,
    pub last_message_time: String,
    pub unread_count: i64,
}

impl From<SummaryRow> for ConversationSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            name: format!("Contact {}", row.conversation_id),
            conversation_id: row.conversation_id,
            last_message: Some(row.last_message),
            last_message_time: Some(parse_timestamp(&row.last_message_time)),
            unread_count: row.unread_count,
            is_pinned: false,
            is_muted: false,
        }
    }
}

// ============================================================================
// Webhook Models
// ============================================================================

/// Inbound payload from external systems. Two shapes share one envelope: a
/// new contact message (`type = "message"`) or a delivery-state update
/// selected by `id` or `correlation_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type", default)]
    pub event: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<DeliveryStatus>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}
