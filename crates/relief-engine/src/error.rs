//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the scenario
//! run so `run` can propagate with `?`; `main` adds context with `anyhow`.

use relief_core::{ConfigError, SimulationError};

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Building or driving the simulation failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}
