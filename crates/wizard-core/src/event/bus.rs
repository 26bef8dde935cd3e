//! Broadcast event bus for distributing `WizardEvent` to multiple subscribers.
//!
//! Built on `tokio::sync::broadcast`, the `EventBus` supports any number of
//! subscribers. Publishing with no active subscribers is a no-op.

use tokio::sync::broadcast;
use wizard_types::config::EngineConfig;
use wizard_types::event::WizardEvent;

/// Multi-consumer bus for wizard events.
///
/// Cloning the bus clones the sender, so clones publish into the same channel.
pub struct EventBus<T> {
    sender: broadcast::Sender<WizardEvent<T>>,
}

impl<T: Clone> EventBus<T> {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.event_capacity)
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent<T>> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: WizardEvent<T>) {
        let _ = self.sender.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> std::fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample_event() -> WizardEvent<u32> {
        WizardEvent::StepEntered {
            step_id: "profile".to_string(),
            data: Arc::new(7),
        }
    }

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(sample_event());

        let received = rx.recv().await.unwrap();
        assert!(matches!(
            received,
            WizardEvent::StepEntered { ref step_id, .. } if step_id == "profile"
        ));
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(sample_event());

        assert!(matches!(rx1.recv().await.unwrap(), WizardEvent::StepEntered { .. }));
        assert!(matches!(rx2.recv().await.unwrap(), WizardEvent::StepEntered { .. }));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::<u32>::new(16);
        bus.publish(sample_event());
        bus.publish(sample_event());
    }

    #[test]
    fn lagged_receiver_handles_gracefully() {
        let bus = EventBus::<u32>::new(4);
        let mut rx = bus.subscribe();

        for i in 0..10 {
            bus.publish(WizardEvent::Failed {
                message: format!("failure {i}"),
            });
        }

        match rx.try_recv() {
            Ok(_) => {}
            Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn clone_shares_channel() {
        let bus = EventBus::new(16);
        let bus2 = bus.clone();
        let mut rx = bus.subscribe();

        bus2.publish(sample_event());

        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn from_config_uses_capacity() {
        let bus = EventBus::<u32>::from_config(&EngineConfig::default());
        let _rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        assert!(format!("{bus:?}").contains("receiver_count"));
    }
}
