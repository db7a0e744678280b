//! Topic-filtered fan-out to live subscribers.
//!
//! [`Broadcaster`] keeps one unbounded channel per subscriber. It is
//! shared via `Arc<Broadcaster>` between the scheduler, the
//! pipeline services, and whatever transport forwards events to clients.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use pathwise_core::event_types::topic_of;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BroadcastEvent
// ---------------------------------------------------------------------------

/// A transient event pushed to live subscribers. Never persisted.
///
/// Serializes as `{"type": ..., "payload": ..., "timestamp": ...}` with an
/// RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastEvent {
    /// Dot-separated event name, e.g. `"job.completed"`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl BroadcastEvent {
    /// Create an event with an empty object payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Segment of the event type before the first `.`.
    pub fn topic(&self) -> &str {
        topic_of(&self.event_type)
    }
}

// ---------------------------------------------------------------------------
// Filters and subscriptions
// ---------------------------------------------------------------------------

/// Which events a subscriber wants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TopicFilter {
    #[default]
    All,
    /// Each entry is either a topic (`"job"`) or a full event type
    /// (`"job.failed"`).
    Topics(BTreeSet<String>),
}

impl TopicFilter {
    /// Build a filter from topics or event types. An empty list means all.
    pub fn topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = topics.into_iter().map(Into::into).collect();
        if set.is_empty() {
            Self::All
        } else {
            Self::Topics(set)
        }
    }

    pub fn matches(&self, event_type: &str) -> bool {
        match self {
            Self::All => true,
            Self::Topics(set) => set.contains(event_type) || set.contains(topic_of(event_type)),
        }
    }
}

/// Opaque subscriber handle.
pub type SubscriberId = Uuid;

/// Returned by [`Broadcaster::subscribe`]. Dropping the receiver makes the
/// subscriber dead; it is pruned on the next publish that targets it.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: mpsc::UnboundedReceiver<BroadcastEvent>,
}

impl Subscription {
    /// Wait for the next event. `None` once the subscriber was removed.
    pub async fn recv(&mut self) -> Option<BroadcastEvent> {
        self.receiver.recv().await
    }

    /// Next already-delivered event, without waiting.
    pub fn try_recv(&mut self) -> Option<BroadcastEvent> {
        self.receiver.try_recv().ok()
    }
}

struct Subscriber {
    filter: TopicFilter,
    sender: mpsc::UnboundedSender<BroadcastEvent>,
}

// ---------------------------------------------------------------------------
// Broadcaster
// ---------------------------------------------------------------------------

/// Publish/subscribe hub with per-subscriber topic filters.
///
/// Thread-safe via interior `RwLock`; scheduler ticks and manual triggers
/// may publish concurrently.
pub struct Broadcaster {
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a subscriber with `filter`.
    pub async fn subscribe(&self, filter: TopicFilter) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::now_v7();
        self.subscribers
            .write()
            .await
            .insert(id, Subscriber { filter, sender });
        tracing::debug!(subscriber = %id, "Subscriber added");
        Subscription { id, receiver }
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber = %id, "Subscriber removed");
        }
        removed
    }

    /// Deliver `event` to every matching subscriber.
    ///
    /// Subscribers whose channel is closed are dropped from the set.
    /// Returns the number of subscribers the event was delivered to.
    pub async fn publish(&self, event: BroadcastEvent) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();
        {
            let subs = self.subscribers.read().await;
            for (id, sub) in subs.iter() {
                if !sub.filter.matches(&event.event_type) {
                    continue;
                }
                if sub.sender.send(event.clone()).is_ok() {
                    delivered += 1;
                } else {
                    dead.push(*id);
                }
            }
        }

        if !dead.is_empty() {
            let mut subs = self.subscribers.write().await;
            for id in &dead {
                subs.remove(id);
                tracing::debug!(subscriber = %id, event_type = %event.event_type, "Dropped unreachable subscriber");
            }
        }

        delivered
    }

    /// Return the current number of registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Drop every subscriber. Their receivers observe end-of-stream.
    pub async fn clear(&self) {
        let mut subs = self.subscribers.write().await;
        let count = subs.len();
        subs.clear();
        tracing::info!(count, "Cleared all subscribers");
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
