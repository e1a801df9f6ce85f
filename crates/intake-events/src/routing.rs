//! Event bus routing helpers.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::broadcast::{self, Sender};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::payloads::{DEFAULT_REPLAY_CAPACITY, EventEnvelope, EventId, IntakeEvent};

/// Stream handed to subscribers: replayed backlog first, then live events.
pub type EventStream = Pin<Box<dyn Stream<Item = EventEnvelope> + Send>>;

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    state: Arc<Mutex<BusState>>,
    replay_capacity: usize,
}

struct BusState {
    next_id: EventId,
    replay: VecDeque<EventEnvelope>,
}

impl EventBus {
    /// Construct a bus with a custom replay capacity.
    #[must_use]
    pub fn with_capacity(replay_capacity: usize) -> Self {
        let replay_capacity = replay_capacity.max(1);
        let (sender, _) = broadcast::channel(replay_capacity);
        Self {
            sender,
            state: Arc::new(Mutex::new(BusState {
                next_id: 1,
                replay: VecDeque::with_capacity(replay_capacity),
            })),
            replay_capacity,
        }
    }

    /// Construct a bus with the default replay capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Subscribe to the bus.
    ///
    /// When `last_event_id` is supplied, retained events newer than it are
    /// yielded before live ones. Lagged receivers skip the dropped events.
    #[must_use]
    pub fn subscribe(&self, last_event_id: Option<EventId>) -> EventStream {
        let rx = self.sender.subscribe();
        let backlog = last_event_id.map_or_else(Vec::new, |id| self.backlog_since(id));
        let high_water = backlog.last().map(|env| env.id);
        let live = BroadcastStream::new(rx).filter_map(move |item| match item {
            Ok(env) if high_water.is_none_or(|seen| env.id > seen) => Some(env),
            _ => None,
        });
        Box::pin(tokio_stream::iter(backlog).chain(live))
    }

    /// Publish a new event to all subscribers and return its id.
    pub fn publish(&self, event: IntakeEvent) -> EventId {
        let mut state = self.lock_state();
        let id = state.next_id;
        state.next_id = state.next_id.saturating_add(1);

        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };
        if state.replay.len() == self.replay_capacity {
            let _ = state.replay.pop_front();
        }
        state.replay.push_back(envelope.clone());
        // No receivers is fine: the replay ring still records the event.
        let _ = self.sender.send(envelope);
        id
    }

    /// Last event id observed in the replay buffer.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.lock_state().replay.back().map(|env| env.id)
    }

    /// Collect retained events emitted after the specified id.
    #[must_use]
    pub fn backlog_since(&self, id: EventId) -> Vec<EventEnvelope> {
        self.lock_state()
            .replay
            .iter()
            .filter(|env| env.id > id)
            .cloned()
            .collect()
    }

    fn lock_state(&self) -> MutexGuard<'_, BusState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn started(name: &str) -> IntakeEvent {
        IntakeEvent::SubmissionStarted {
            submission_id: Uuid::new_v4(),
            filename: name.to_string(),
        }
    }

    #[tokio::test]
    async fn publish_and_replay_from_id() {
        let bus = EventBus::with_capacity(4);
        let first = bus.publish(started("a.png"));
        let second = bus.publish(started("b.png"));

        assert_eq!(bus.last_event_id(), Some(second));
        let backlog = bus.backlog_since(first);
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].id, second);
    }

    #[tokio::test]
    async fn replay_ring_drops_oldest_when_full() {
        let bus = EventBus::with_capacity(2);
        for name in ["a", "b", "c"] {
            let _ = bus.publish(started(name));
        }
        let ids: Vec<_> = bus.backlog_since(0).into_iter().map(|env| env.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn subscribe_yields_backlog_then_live_events() {
        let bus = EventBus::new();
        let first = bus.publish(started("a.png"));
        let second = bus.publish(started("b.png"));

        let mut stream = bus.subscribe(Some(first));
        let third = bus.publish(started("c.png"));

        let replayed = stream.next().await.expect("backlog item");
        assert_eq!(replayed.id, second);
        let live = stream.next().await.expect("live item");
        assert_eq!(live.id, third);
    }

    #[tokio::test]
    async fn subscribe_without_cursor_only_sees_new_events() {
        let bus = EventBus::new();
        let _ = bus.publish(started("old.png"));
        let mut stream = bus.subscribe(None);
        let id = bus.publish(started("new.png"));
        let envelope = stream.next().await.expect("stream item");
        assert_eq!(envelope.id, id);
        assert!(matches!(
            envelope.event,
            IntakeEvent::SubmissionStarted { ref filename, .. } if filename == "new.png"
        ));
    }
}
