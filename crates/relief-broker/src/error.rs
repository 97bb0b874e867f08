//! Error types for the broker.
//!
//! [`BrokerError`] is returned to whoever called `publish` for the top-level
//! message. [`DeliveryError`] describes one subscriber failing on one
//! message; the broker logs it and moves on to the next subscriber.

use relief_types::{AgentId, MessageError, Topic};

/// Errors returned by broker operations.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The message failed validation at the broker boundary and was dropped.
    #[error("message rejected: {source}")]
    Invalid {
        /// The validation failure.
        #[from]
        source: MessageError,
    },

    /// A reaction chain exceeded the configured cascade depth.
    #[error("cascade depth {depth} exceeded while publishing on {topic}")]
    CascadeTooDeep {
        /// Depth at which the chain was cut.
        depth: usize,
        /// Topic of the dropped message.
        topic: Topic,
    },

    /// A broker lock was poisoned by a panicking holder.
    #[error("broker lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

/// One subscriber failing to handle one message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The subscriber returned an error for the message.
    #[error("{agent} failed on {topic}: {reason}")]
    Rejected {
        /// The failing subscriber.
        agent: AgentId,
        /// Topic of the message.
        topic: Topic,
        /// Why the subscriber failed.
        reason: String,
    },

    /// The subscriber's lock was poisoned by an earlier panic.
    #[error("{0} is unavailable: lock poisoned")]
    Poisoned(AgentId),
}

impl DeliveryError {
    /// Build a [`DeliveryError::Rejected`] from any displayable error.
    pub fn rejected(agent: &AgentId, topic: &Topic, reason: impl core::fmt::Display) -> Self {
        Self::Rejected {
            agent: agent.clone(),
            topic: topic.clone(),
            reason: reason.to_string(),
        }
    }
}
