//! Shared type definitions for the disaster response simulation.
//!
//! This crate is the single source of truth for the types that flow between
//! the broker, the shared disaster context and the four agents.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers (UUID v7 for simulation entities,
//!   string names for externally named ones)
//! - [`enums`] -- Severity, bounded scales, resources, skills, task status
//! - [`structs`] -- Assessments, plans, volunteers, tasks, victims, alerts
//! - [`topic`] -- Broker topics and their accepted payload kinds
//! - [`message`] -- The [`Message`] envelope and the [`Payload`] union
//! - [`error`] -- Scale and message validation errors

pub mod enums;
pub mod error;
pub mod ids;
pub mod message;
pub mod structs;
pub mod topic;

// Re-export all public types at crate root for convenience.
pub use enums::{Priority, Resource, RiskLevel, Severity, Skill, TaskStatus, Urgency};
pub use error::{MessageError, ScaleError};
pub use ids::{AgentId, MessageId, TaskId, TeamId, VictimRequestId, VolunteerId};
pub use message::{AssignmentNotice, Message, Payload, PayloadKind, RescueDispatch};
pub use structs::{
    Alert, AllocationPlan, AreaAssessment, AreaSurvey, DisasterDeclaration,
    EnvironmentalReading, GeoPoint, SeismicReading, Task, VictimRequest, VictimStatus,
    Volunteer, WeatherReading,
};
pub use topic::Topic;
