//! Integration tests for the parlor server

use reqwest::Client;
use serde_json::json;

const BASE_URL: &str = "http://localhost:8970";

#[tokio::test]
async fn test_health_check() {
    let client = Client::new();
    let response = client.get(format!("{}/health", BASE_URL)).send().await;

    match response {
        Ok(resp) => {
            assert!(resp.status().is_success());
            let body: serde_json::Value = resp.json().await.unwrap();
            assert_eq!(body["status"], "ok");
        }
        Err(_) => {
            // Server not running, skip test
            println!("Server not running, skipping health check test");
        }
    }
}

#[tokio::test]
async fn test_conversations_always_an_array() {
    let client = Client::new();
    let response = client.get(format!("{}/conversations", BASE_URL)).send().await;

    match response {
        Ok(resp) => {
            assert!(resp.status().is_success());
            let body: serde_json::Value = resp.json().await.unwrap();
            assert!(body.is_array());
        }
        Err(_) => {
            println!("Server not running, skipping conversations test");
        }
    }
}

#[tokio::test]
async fn test_post_message_returns_persisted_record() {
    let client = Client::new();
    let response = client
        .post(format!("{}/messages", BASE_URL))
        .json(&json!({
            "conversation_id": "it-roundtrip",
            "text": "integration hello",
            "kind": "text",
            "direction": "user",
            "status": "sent"
        }))
        .send()
        .await;

    match response {
        Ok(resp) => {
            assert!(resp.status().is_success());
            let body: serde_json::Value = resp.json().await.unwrap();
            assert_eq!(body["conversation_id"], "it-roundtrip");
            assert!(body["id"].as_str().map(|s| !s.is_empty()).unwrap_or(false));
            assert!(body["timestamp"].is_string());
        }
        Err(_) => {
            println!("Server not running, skipping message roundtrip test");
        }
    }
}

#[tokio::test]
async fn test_malformed_webhook_rejected() {
    let client = Client::new();
    let response = client
        .post(format!("{}/webhook", BASE_URL))
        .json(&json!({ "unrelated": true }))
        .send()
        .await;

    match response {
        Ok(resp) => {
            assert_eq!(resp.status(), 400);
        }
        Err(_) => {
            println!("Server not running, skipping webhook test");
        }
    }
}

mod storage_tests {
    use chrono::{DateTime, TimeZone, Utc};
    use parlor_server::models::{DeliveryStatus, Direction, MessageKind, NewMessage};
    use parlor_server::storage::Storage;

    fn draft(
        conversation_id: &str,
        text: &str,
        direction: Direction,
        timestamp: Option<DateTime<Utc>>,
    ) -> NewMessage {
        NewMessage {
            conversation_id: conversation_id.to_string(),
            text: text.to_string(),
            timestamp,
            kind: MessageKind::Text,
            direction,
            status: match direction {
                Direction::User => DeliveryStatus::Sent,
                Direction::Contact => DeliveryStatus::Delivered,
            },
            correlation_id: None,
        }
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, min, 0).unwrap()
    }

    async fn temp_storage() -> Storage {
        let path = std::env::temp_dir().join(format!("parlor-test-{}.db", uuid::Uuid::new_v4()));
        Storage::connect(&path.display().to_string())
            .await
            .expect("temp database")
    }

    #[tokio::test]
    async fn append_assigns_id_and_timestamp() {
        let storage = temp_storage().await;

        let before = Utc::now();
        let saved = storage
            .append_message(draft("c1", "hello", Direction::User, None))
            .await
            .unwrap();

        assert!(!saved.id.is_empty());
        assert!(!saved.id.starts_with("local-"));
        assert!(saved.timestamp >= before);
        assert_eq!(saved.status, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn messages_come_back_in_ascending_timestamp_order() {
        let storage = temp_storage().await;

        storage
            .append_message(draft("c1", "second", Direction::User, Some(at(10, 0))))
            .await
            .unwrap();
        storage
            .append_message(draft("c1", "third", Direction::Contact, Some(at(11, 30))))
            .await
            .unwrap();
        storage
            .append_message(draft("c1", "first", Direction::Contact, Some(at(9, 15))))
            .await
            .unwrap();

        let messages = storage.list_messages("c1").await.unwrap();
        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn messages_do_not_leak_across_conversations() {
        let storage = temp_storage().await;

        storage
            .append_message(draft("c1", "ours", Direction::User, Some(at(10, 0))))
            .await
            .unwrap();
        storage
            .append_message(draft("c2", "theirs", Direction::User, Some(at(10, 5))))
            .await
            .unwrap();

        let messages = storage.list_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "ours");
    }

    #[tokio::test]
    async fn summaries_sorted_by_newest_message_with_synthesized_names() {
        let storage = temp_storage().await;

        storage
            .append_message(draft("old", "stale", Direction::User, Some(at(8, 0))))
            .await
            .unwrap();
        storage
            .append_message(draft("busy", "earlier", Direction::Contact, Some(at(9, 0))))
            .await
            .unwrap();
        storage
            .append_message(draft("busy", "latest", Direction::Contact, Some(at(12, 0))))
            .await
            .unwrap();

        let summaries = storage.list_conversations().await.unwrap();
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].conversation_id, "busy");
        assert_eq!(summaries[0].name, "Contact busy");
        assert_eq!(summaries[0].last_message.as_deref(), Some("latest"));
        assert_eq!(summaries[0].unread_count, 2);

        assert_eq!(summaries[1].conversation_id, "old");
        assert_eq!(summaries[1].unread_count, 0);
    }

    #[tokio::test]
    async fn unread_counts_only_contact_messages() {
        let storage = temp_storage().await;

        storage
            .append_message(draft("c1", "from me", Direction::User, Some(at(10, 0))))
            .await
            .unwrap();
        storage
            .append_message(draft("c1", "from them", Direction::Contact, Some(at(10, 1))))
            .await
            .unwrap();
        storage
            .append_message(draft("c1", "me again", Direction::User, Some(at(10, 2))))
            .await
            .unwrap();

        let summaries = storage.list_conversations().await.unwrap();
        assert_eq!(summaries[0].unread_count, 1);
    }

    #[tokio::test]
    async fn unread_count_caps_at_99_for_display() {
        let storage = temp_storage().await;

        for i in 0..105u32 {
            storage
                .append_message(draft(
                    "flood",
                    &format!("msg {}", i),
                    Direction::Contact,
                    Some(at(10, 0) + chrono::Duration::seconds(i as i64)),
                ))
                .await
                .unwrap();
        }

        let summaries = storage.list_conversations().await.unwrap();
        assert_eq!(summaries[0].unread_count, 99);
    }

    #[tokio::test]
    async fn detached_store_reads_empty_and_synthesizes_appends() {
        let storage = Storage::detached();

        assert!(storage.list_conversations().await.unwrap().is_empty());
        assert!(storage.list_messages("c1").await.unwrap().is_empty());

        let saved = storage
            .append_message(draft("c1", "best effort", Direction::User, None))
            .await
            .unwrap();
        assert!(saved.id.starts_with("local-"));
        assert_eq!(saved.text, "best effort");

        // Nothing actually landed
        assert!(storage.list_messages("c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_text_is_not_validated_away() {
        let storage = temp_storage().await;

        // Attachment captions are synthesized client-side; the store stays
        // lenient about bodies.
        let mut caption_draft = draft("c1", "", Direction::User, None);
        caption_draft.kind = MessageKind::Document;
        let saved = storage.append_message(caption_draft).await.unwrap();

        assert_eq!(saved.text, "");
        assert_eq!(storage.list_messages("c1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_update_by_correlation_id() {
        let storage = temp_storage().await;

        let mut webhook_draft = draft("c1", "inbound", Direction::Contact, Some(at(10, 0)));
        webhook_draft.correlation_id = Some("ext-42".to_string());
        storage.append_message(webhook_draft).await.unwrap();

        let updated = storage
            .update_status_by_correlation("ext-42", DeliveryStatus::Read)
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let messages = storage.list_messages("c1").await.unwrap();
        assert_eq!(messages[0].status, DeliveryStatus::Read);
    }

    #[tokio::test]
    async fn status_update_with_unknown_selector_touches_nothing() {
        let storage = temp_storage().await;

        storage
            .append_message(draft("c1", "hello", Direction::User, None))
            .await
            .unwrap();

        let by_id = storage
            .update_status_by_id("no-such-id", DeliveryStatus::Read)
            .await
            .unwrap();
        let by_corr = storage
            .update_status_by_correlation("no-such-corr", DeliveryStatus::Read)
            .await
            .unwrap();

        assert_eq!(by_id, 0);
        assert_eq!(by_corr, 0);

        let messages = storage.list_messages("c1").await.unwrap();
        assert_eq!(messages[0].status, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn status_update_by_id() {
        let storage = temp_storage().await;

        let saved = storage
            .append_message(draft("c1", "hello", Direction::User, None))
            .await
            .unwrap();

        let updated = storage
            .update_status_by_id(&saved.id, DeliveryStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let messages = storage.list_messages("c1").await.unwrap();
        assert_eq!(messages[0].status, DeliveryStatus::Delivered);
    }
}
