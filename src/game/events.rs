use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

/// Zero-payload notifications: "state changed, re-read it".
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameEvent {
    BoardPositionChanged,
    GamePaused,
    GameResumed,
    GameSaved,
    SettingsUpdated,
}

/// Subscribers of game notifications. Subscribers that hung up are dropped
/// on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<GameEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub fn publish(&mut self, event: GameEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_sees_each_event() {
        let mut bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.publish(GameEvent::GamePaused);

        assert_eq!(first.try_recv(), Ok(GameEvent::GamePaused));
        assert_eq!(second.try_recv(), Ok(GameEvent::GamePaused));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        bus.publish(GameEvent::SettingsUpdated);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Ok(GameEvent::SettingsUpdated));
    }
}
