//! Synchronous topic-keyed message broker for the disaster response
//! simulation.
//!
//! # Modules
//!
//! - [`broker`] -- [`MessageBroker`]: subscription table, validation, ordered
//!   delivery with failure isolation, and the reaction cascade.
//! - [`error`] -- [`BrokerError`] for callers, [`DeliveryError`] for one
//!   subscriber failing on one message.
//! - [`journal`] -- Bounded record of accepted messages.
//! - [`subscriber`] -- The [`Subscriber`] trait agents implement.

pub mod broker;
pub mod error;
pub mod journal;
pub mod subscriber;

// Re-export primary types at crate root.
pub use broker::{
    BrokerConfig, DEFAULT_JOURNAL_CAPACITY, DEFAULT_MAX_CASCADE_DEPTH, MessageBroker,
    PublishReport,
};
pub use error::{BrokerError, DeliveryError};
pub use journal::Journal;
pub use subscriber::{SharedSubscriber, Subscriber, shared};
