//! Error types for driving a simulation.

use relief_broker::BrokerError;
use relief_types::{MessageError, ScaleError};
use relief_world::ContextError;

/// Errors returned by [`Simulation`](crate::simulation::Simulation)
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The broker rejected a driver message.
    #[error("broker error: {source}")]
    Broker {
        /// The underlying broker error.
        #[from]
        source: BrokerError,
    },

    /// The shared context rejected an operation.
    #[error("context error: {source}")]
    Context {
        /// The underlying context error.
        #[from]
        source: ContextError,
    },

    /// A configured topic name is not valid.
    #[error("invalid topic: {source}")]
    Topic {
        /// The underlying message error.
        #[from]
        source: MessageError,
    },

    /// A configured scale value is out of range.
    #[error("invalid scale: {source}")]
    Scale {
        /// The underlying scale error.
        #[from]
        source: ScaleError,
    },

    /// An agent lock was poisoned by a panicking holder.
    #[error("agent lock poisoned: {0}")]
    LockPoisoned(&'static str),
}
