//! Message store backed by SQLite.
//!
//! The adapter runs in one of two modes: connected, where messages persist
//! and conversation summaries are derived by aggregation, or detached, where
//! reads yield empty sequences and appends synthesize non-durable records so
//! the client's optimistic flow can proceed. Callers cannot distinguish an
//! empty store from an unreachable one through the read operations.

use chrono::{SecondsFormat, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use uuid::Uuid;

use crate::models::*;

pub struct Storage {
    pool: Option<Pool<Sqlite>>,
}

impl Storage {
    pub async fn connect(database_path: &str) -> anyhow::Result<Self> {
        // Ensure directory exists
        if let Some(parent) = Path::new(database_path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await?;

        let storage = Self { pool: Some(pool) };
        storage.initialize_schema().await?;

        Ok(storage)
    }

    /// A store with no backing database. Reads are empty, appends are
    /// best-effort synthesized records.
    pub fn detached() -> Self {
        Self { pool: None }
    }

    pub fn is_detached(&self) -> bool {
        self.pool.is_none()
    }

    async fn initialize_schema(&self) -> anyhow::Result<()> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL,
                text TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                kind TEXT NOT NULL,
                direction TEXT NOT NULL,
                status TEXT NOT NULL,
                correlation_id TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id);
            CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp);
            CREATE INDEX IF NOT EXISTS idx_messages_correlation ON messages(correlation_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    // ========================================================================
    // Conversation Operations
    // ========================================================================

    /// Conversation summaries, newest last-message first. One grouping
    /// aggregation over the message collection; the bare `text` column is
    /// taken from the MAX(timestamp) row per SQLite's aggregate semantics.
    /// The unread cap at 99 is display policy, not truncation.
    pub async fn list_conversations(&self) -> anyhow::Result<Vec<ConversationSummary>> {
        let Some(pool) = &self.pool else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT conversation_id,
                    text AS last_message,
                    MAX(timestamp) AS last_message_time,
                    MIN(SUM(CASE WHEN direction = 'contact' THEN 1 ELSE 0 END), 99) AS unread_count
             FROM messages
             GROUP BY conversation_id
             ORDER BY last_message_time DESC",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(ConversationSummary::from).collect())
    }

    // ========================================================================
    // Message Operations
    // ========================================================================

    /// All messages for one conversation in ascending timestamp order.
    pub async fn list_messages(&self, conversation_id: &str) -> anyhow::Result<Vec<Message>> {
        let Some(pool) = &self.pool else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, StoredMessage>(
            "SELECT id, conversation_id, text, timestamp, kind, direction, status, correlation_id
             FROM messages
             WHERE conversation_id = ?
             ORDER BY timestamp ASC",
        )
        .bind(conversation_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    /// Persist a draft and return the record with its assigned identifier.
    /// Stamps the timestamp with now when the draft carries none. Detached
    /// mode returns a synthesized `local-` record instead; a non-error
    /// response therefore does not imply durability.
    pub async fn append_message(&self, draft: NewMessage) -> anyhow::Result<Message> {
        let timestamp = draft.timestamp.unwrap_or_else(Utc::now);

        let Some(pool) = &self.pool else {
            return Ok(Message {
                id: format!("local-{}", Uuid::new_v4()),
                conversation_id: draft.conversation_id,
                text: draft.text,
                timestamp,
                kind: draft.kind,
                direction: draft.direction,
                status: draft.status,
                correlation_id: draft.correlation_id,
            });
        };

        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO messages
             (id, conversation_id, text, timestamp, kind, direction, status, correlation_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&draft.conversation_id)
        .bind(&draft.text)
        .bind(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
        .bind(draft.kind.to_string())
        .bind(draft.direction.to_string())
        .bind(draft.status.to_string())
        .bind(&draft.correlation_id)
        .execute(pool)
        .await?;

        Ok(Message {
            id,
            conversation_id: draft.conversation_id,
            text: draft.text,
            timestamp,
            kind: draft.kind,
            direction: draft.direction,
            status: draft.status,
            correlation_id: draft.correlation_id,
        })
    }

    // ========================================================================
    // Delivery-State Updates
    // ========================================================================

    pub async fn update_status_by_id(
        &self,
        id: &str,
        status: DeliveryStatus,
    ) -> anyhow::Result<u64> {
        let Some(pool) = &self.pool else {
            return Ok(0);
        };

        let result = sqlx::query("UPDATE messages SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_status_by_correlation(
        &self,
        correlation_id: &str,
        status: DeliveryStatus,
    ) -> anyhow::Result<u64> {
        let Some(pool) = &self.pool else {
            return Ok(0);
        };

        let result = sqlx::query("UPDATE messages SET status = ? WHERE correlation_id = ?")
            .bind(status.to_string())
            .bind(correlation_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
