//! REST client for the parlor server.

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::state::{Conversation, Message, NewMessage};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {0}")]
    Status(StatusCode),
}

pub type Result<T> = std::result::Result<T, ApiError>;

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Conversation summaries, newest first. The server never errors this
    /// endpoint; transport failures still surface here and the caller
    /// decides how far to degrade.
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let resp = self
            .http
            .get(format!("{}/conversations", self.base_url))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }

        Ok(resp.json().await?)
    }

    /// Messages for one conversation, ascending by timestamp.
    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let resp = self
            .http
            .get(format!("{}/messages/{}", self.base_url, conversation_id))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }

        Ok(resp.json().await?)
    }

    /// Persist a draft and return the stored record with its assigned
    /// identifier. A success response does not promise durability; the
    /// server may be running detached from its database.
    pub async fn append_message(&self, draft: &NewMessage) -> Result<Message> {
        let resp = self
            .http
            .post(format!("{}/messages", self.base_url))
            .json(draft)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }

        Ok(resp.json().await?)
    }
}
