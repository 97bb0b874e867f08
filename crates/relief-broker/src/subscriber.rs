//! The subscriber seam between the broker and the agents.
//!
//! An agent is a pure reaction function over its own state: the broker hands
//! it a message and gets back the messages it wants published. Agents never
//! call each other or the broker directly, which keeps every agent testable
//! by calling [`Subscriber::deliver`] alone.

use std::sync::{Arc, Mutex};

use relief_types::{AgentId, Message};

use crate::error::DeliveryError;

/// Something that can be attached to broker topics.
pub trait Subscriber: Send {
    /// Stable identity used for idempotent subscription.
    fn id(&self) -> &AgentId;

    /// React to one message.
    ///
    /// Returns the messages to publish as a consequence, in emission order.
    /// An error is isolated by the broker: it is logged and the remaining
    /// subscribers still receive the message.
    fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError>;
}

/// A subscriber shared between the broker and its owner.
///
/// The mutex is the per-agent critical section: concurrent publishes can
/// never interleave two deliveries to the same agent.
pub type SharedSubscriber = Arc<Mutex<dyn Subscriber>>;

/// Wrap a subscriber for registration with the broker.
pub fn shared<S: Subscriber + 'static>(subscriber: S) -> Arc<Mutex<S>> {
    Arc::new(Mutex::new(subscriber))
}
