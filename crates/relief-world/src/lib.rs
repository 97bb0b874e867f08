//! Shared disaster state and geography for the disaster response simulation.
//!
//! # Modules
//!
//! - [`context`] -- [`DisasterContext`]: the declaration, affected areas and
//!   environment snapshot shared by every agent, plus the single
//!   [`AssessmentWriter`] capability.
//! - [`environment`] -- Latest weather and seismic conditions.
//! - [`error`] -- Error types for context operations.
//! - [`geo`] -- Haversine distance and nearest-candidate search.

pub mod context;
pub mod environment;
pub mod error;
pub mod geo;

// Re-export primary types at crate root.
pub use context::{AssessmentWriter, ContextSnapshot, DisasterContext};
pub use environment::EnvironmentSnapshot;
pub use error::ContextError;
