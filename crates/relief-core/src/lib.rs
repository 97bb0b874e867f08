//! Configuration, agent wiring and scenario driver for the disaster response
//! simulation.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `relief-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- [`SimulationError`] for driver operations.
//! - [`scenario`] -- The demo scenario run by the engine binary.
//! - [`simulation`] -- [`Simulation`]: broker, context and agents wired
//!   together, plus driver helpers.
//!
//! [`SimulationError`]: error::SimulationError
//! [`Simulation`]: simulation::Simulation

pub mod config;
pub mod error;
pub mod scenario;
pub mod simulation;

pub use config::{ConfigError, SimulationConfig};
pub use error::SimulationError;
pub use simulation::{Simulation, SimulationSummary};
