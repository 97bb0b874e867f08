//! Error types for the `relief-world` crate.

/// Errors raised by the shared disaster context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// The disaster was already declared; the first declaration stands.
    #[error("disaster context already initialized ({disaster_type} at {location})")]
    AlreadyInitialized {
        /// Disaster type of the standing declaration.
        disaster_type: String,
        /// Location of the standing declaration.
        location: String,
    },

    /// The single assessment writer has already been handed out.
    #[error("assessment writer already claimed")]
    WriterAlreadyClaimed,

    /// A lock guarding context state was poisoned by a panicking holder.
    #[error("context lock poisoned: {0}")]
    LockPoisoned(&'static str),
}
