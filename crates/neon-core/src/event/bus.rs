//! Broadcast bus for `ConversationEvent`.
//!
//! Publishing with no active subscribers is a no-op. Slow subscribers lag
//! and skip ahead instead of blocking publishers.

use neon_types::event::ConversationEvent;
use tokio::sync::broadcast;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 256;

/// Multi-consumer bus for conversation change events.
///
/// Cloning the bus clones the sender, so every clone publishes into the
/// same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ConversationEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ConversationEvent) {
        let _ = self.sender.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_types::conversation::Modality;
    use uuid::Uuid;

    fn created() -> ConversationEvent {
        ConversationEvent::ConversationCreated {
            conversation_id: Uuid::now_v7(),
            modality: Modality::Image,
        }
    }

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(created());

        let received = rx.recv().await.unwrap();
        assert!(matches!(
            received,
            ConversationEvent::ConversationCreated {
                modality: Modality::Image,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = created();
        let id = event.conversation_id();
        bus.publish(event);

        assert_eq!(rx1.recv().await.unwrap().conversation_id(), id);
        assert_eq!(rx2.recv().await.unwrap().conversation_id(), id);
    }

    #[test]
    fn publish_with_no_subscribers_is_noop() {
        let bus = EventBus::default();
        bus.publish(created());
        assert_eq!(bus.receiver_count(), 0);
    }

    #[test]
    fn lagged_receiver_skips_ahead() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();

        for i in 0..10 {
            bus.publish(ConversationEvent::ConversationUpdated {
                conversation_id: Uuid::now_v7(),
                preview: format!("preview {i}"),
            });
        }

        match rx.try_recv() {
            Err(broadcast::error::TryRecvError::Lagged(n)) => assert_eq!(n, 6),
            other => panic!("expected lag, got {other:?}"),
        }
        // After the lag report the newest four are still readable
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn clone_shares_channel() {
        let bus = EventBus::new(16);
        let bus2 = bus.clone();
        let mut rx = bus.subscribe();

        bus2.publish(created());

        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn debug_shows_receiver_count() {
        let bus = EventBus::new(16);
        let _rx = bus.subscribe();
        let debug = format!("{bus:?}");
        assert!(debug.contains("EventBus"));
        assert!(debug.contains("receiver_count: 1"));
    }
}
