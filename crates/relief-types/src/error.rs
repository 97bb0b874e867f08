//! Error types for shared type construction and message validation.

use crate::message::PayloadKind;
use crate::topic::Topic;

/// A raw value fell outside a bounded scale.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScaleError {
    /// The value is not within `[min, max]`.
    #[error("{scale} value {value} outside {min}..={max}")]
    OutOfRange {
        /// Name of the scale being validated.
        scale: &'static str,
        /// The rejected value.
        value: u32,
        /// Lowest accepted value.
        min: u32,
        /// Highest accepted value.
        max: u32,
    },
}

/// Errors raised while building or validating a [`Message`].
///
/// [`Message`]: crate::message::Message
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The topic name is neither a fixed topic nor a `*_alert` topic.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// The payload kind is not the one the topic accepts.
    #[error("topic {topic} expects {expected:?} payload, got {actual:?}")]
    SchemaMismatch {
        /// The topic the message was addressed to.
        topic: Topic,
        /// The payload kind the topic accepts.
        expected: PayloadKind,
        /// The payload kind the message carried.
        actual: PayloadKind,
    },

    /// The JSON payload does not match any known shape.
    #[error("malformed payload for topic {topic}: {source}")]
    Malformed {
        /// The topic the payload was addressed to.
        topic: String,
        /// The underlying decoding error.
        source: serde_json::Error,
    },
}
