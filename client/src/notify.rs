//! Notification channel capability.
//!
//! The messaging flow is correct without any live channel; this interface
//! only exists so server-originated events (messages from other clients,
//! delivery-state changes) have somewhere to land when a transport does
//! exist. The default implementation is permanently disconnected.

use crate::state::{DeliveryStatus, Message, SessionState};

#[derive(Debug, Clone)]
pub enum ChannelEvent {
    NewMessage(Message),
    StatusUpdate { id: String, status: DeliveryStatus },
}

pub trait NotificationChannel: Send {
    /// Drain events received since the last poll.
    fn poll(&mut self) -> Vec<ChannelEvent>;

    /// Announce a locally persisted message to interested peers.
    fn announce(&mut self, message: &Message);

    fn is_connected(&self) -> bool;
}

/// The default channel: never connects to any counterpart. Announcements go
/// nowhere and polls are always empty.
#[derive(Debug, Default)]
pub struct Disconnected;

impl NotificationChannel for Disconnected {
    fn poll(&mut self) -> Vec<ChannelEvent> {
        Vec::new()
    }

    fn announce(&mut self, _message: &Message) {}

    fn is_connected(&self) -> bool {
        false
    }
}

/// Apply everything the channel has queued to the session state.
pub fn drain(channel: &mut dyn NotificationChannel, state: &mut SessionState) {
    for event in channel.poll() {
        match event {
            ChannelEvent::NewMessage(message) => state.apply_inbound(message),
            ChannelEvent::StatusUpdate { id, status } => state.apply_status(&id, status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Direction, MessageKind};
    use chrono::{TimeZone, Utc};

    struct Scripted(Vec<ChannelEvent>);

    impl NotificationChannel for Scripted {
        fn poll(&mut self) -> Vec<ChannelEvent> {
            std::mem::take(&mut self.0)
        }

        fn announce(&mut self, _message: &Message) {}

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn inbound(id: &str, conversation_id: &str) -> Message {
        Message {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            text: "from afar".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap(),
            kind: MessageKind::Text,
            direction: Direction::Contact,
            status: DeliveryStatus::Delivered,
            correlation_id: None,
        }
    }

    #[test]
    fn disconnected_channel_is_inert() {
        let mut channel = Disconnected;
        let mut state = SessionState::new();

        assert!(!channel.is_connected());
        drain(&mut channel, &mut state);

        assert!(state.conversations().is_empty());
        assert!(state.messages().is_empty());
    }

    #[test]
    fn drain_applies_messages_and_status_updates() {
        let mut state = SessionState::new();
        state.select_conversation("c1");

        let mut channel = Scripted(vec![
            ChannelEvent::NewMessage(inbound("srv-1", "c1")),
            ChannelEvent::StatusUpdate {
                id: "srv-1".to_string(),
                status: DeliveryStatus::Read,
            },
        ]);

        drain(&mut channel, &mut state);

        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].status, DeliveryStatus::Read);

        // Second drain finds nothing new
        drain(&mut channel, &mut state);
        assert_eq!(state.messages().len(), 1);
    }
}
