//! The four disaster response agents.
//!
//! Every agent is a [`Subscriber`](relief_broker::Subscriber): a reaction
//! function over its own state that takes one message and returns the
//! messages to publish. None of them hold a broker handle or talk to each
//! other directly, so each one is testable by calling `deliver` alone.
//!
//! # Modules
//!
//! - [`analytics`] -- Need assessment and environmental risk ([`AnalyticsAgent`])
//! - [`communication`] -- Victim intake, rescue team tracking, alert relay
//!   ([`CommunicationAgent`])
//! - [`config`] -- Per-agent tunables with YAML defaults
//! - [`error`] -- Error types for agent handlers ([`AgentError`])
//! - [`pool`] -- The relief resource pool ([`ResourcePool`])
//! - [`relief`] -- Prioritized allocation ([`ReliefCoordinator`])
//! - [`skills`] -- Resource to skill mapping
//! - [`volunteer`] -- Task synthesis and assignment ([`VolunteerCoordinator`])

pub mod analytics;
pub mod communication;
pub mod config;
pub mod error;
pub mod pool;
pub mod relief;
pub mod skills;
pub mod volunteer;

// Re-export primary types at crate root for convenience.
pub use analytics::{AnalyticsAgent, Prediction, SEISMIC_RISK, WEATHER_IMPACT};
pub use communication::{CommunicationAgent, proximity_boost};
pub use config::{AnalyticsConfig, CommunicationConfig, ReliefConfig};
pub use error::AgentError;
pub use pool::{Allocation, ResourcePool};
pub use relief::ReliefCoordinator;
pub use skills::required_skill_for;
pub use volunteer::VolunteerCoordinator;
