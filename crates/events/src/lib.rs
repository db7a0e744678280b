//! Change broadcaster for live dashboards.
//!
//! - [`Broadcaster`]: topic-filtered publish/subscribe hub with explicit
//!   subscriber lifecycle and dead-subscriber pruning.
//! - [`BroadcastEvent`]: the `{type, payload, timestamp}` envelope.
//!
//! Delivery is at-most-once and best-effort: there is no buffering beyond
//! each subscriber's channel and no redelivery.

pub mod bus;

pub use bus::{BroadcastEvent, Broadcaster, Subscription, SubscriberId, TopicFilter};
