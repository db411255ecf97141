//! Parlor server library.
//!
//! Message store and REST surface for the parlor chat client:
//! - Conversation summaries derived from the message collection
//! - Message listing and persistence with optimistic-client semantics
//! - Webhook ingestion for external systems

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod storage;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::storage::Storage;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<Storage>,
}

/// Build the REST surface over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Conversations
        .route("/conversations", get(handlers::conversations::list_conversations))
        // Messages
        .route("/messages/:conversation_id", get(handlers::messages::list_messages))
        .route("/messages", post(handlers::messages::create_message))
        // External-system inbound
        .route("/webhook", post(handlers::webhook::receive_webhook))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
