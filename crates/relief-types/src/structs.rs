//! Core entity structs shared by the broker, the context and the agents.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::{Priority, Resource, RiskLevel, Severity, Skill, TaskStatus, Urgency};
use crate::ids::{TaskId, TeamId, VictimRequestId, VolunteerId};

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Construct a coordinate.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

// ---------------------------------------------------------------------------
// Disaster declaration and assessments
// ---------------------------------------------------------------------------

/// The immutable facts fixed when a disaster is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisasterDeclaration {
    /// Kind of disaster (e.g. `earthquake`, `flood`).
    pub disaster_type: String,
    /// Human-readable location of the epicentre.
    pub location: String,
    /// Severity, read-only after declaration.
    pub severity: Severity,
}

/// Needs and urgency of one affected area.
///
/// Assessments are replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaAssessment {
    /// Unique area name.
    pub area_name: String,
    /// Requested quantity per resource.
    pub needs: BTreeMap<Resource, u32>,
    /// How urgently the area needs help.
    pub urgency: Urgency,
}

/// Field report for one area attached to an assessment request.
///
/// Missing fields are filled in by analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSurvey {
    /// Unique area name.
    pub area_name: String,
    /// Known needs, if already surveyed.
    #[serde(default)]
    pub needs: Option<BTreeMap<Resource, u32>>,
    /// Known urgency, if already surveyed.
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

impl AreaSurvey {
    /// A survey that only names the area.
    pub fn named(area_name: impl Into<String>) -> Self {
        Self {
            area_name: area_name.into(),
            needs: None,
            urgency: None,
        }
    }
}

/// A committed allocation of one resource to one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    /// The receiving area.
    pub area_name: String,
    /// The allocated resource.
    pub resource: Resource,
    /// Quantity taken from the pool (always non-zero).
    pub quantity: u32,
    /// Priority of the area at allocation time.
    pub priority: Priority,
}

// ---------------------------------------------------------------------------
// Volunteers and tasks
// ---------------------------------------------------------------------------

/// A registered volunteer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    /// Volunteer identifier.
    pub id: VolunteerId,
    /// Skills the volunteer can apply.
    pub skills: BTreeSet<Skill>,
    /// Whether the volunteer can take a new task.
    pub available: bool,
}

/// A distribution task synthesized from an allocation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Human-readable description.
    pub description: String,
    /// Destination area.
    pub area_name: String,
    /// Resource to distribute.
    pub resource: Resource,
    /// Quantity to distribute.
    pub quantity: u32,
    /// Skill a volunteer needs to take the task.
    pub required_skill: Skill,
    /// Urgency, copied from the plan priority.
    pub urgency: Priority,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Volunteer holding the task, once assigned.
    pub assignee: Option<VolunteerId>,
}

// ---------------------------------------------------------------------------
// Victims
// ---------------------------------------------------------------------------

/// Where a victim request is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum VictimStatus {
    /// No rescue team has been dispatched yet.
    Open,
    /// A rescue team has been dispatched; the request is closed.
    Dispatched {
        /// The dispatched team.
        team: TeamId,
    },
}

/// A victim's call for help.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VictimRequest {
    /// Request identifier.
    pub id: VictimRequestId,
    /// Where the victim is.
    pub location: GeoPoint,
    /// Free-text description.
    pub description: String,
    /// Urgency as reported by the caller.
    pub reported_urgency: Urgency,
    /// Urgency after the proximity boost.
    pub effective_urgency: Urgency,
    /// Lifecycle state.
    pub status: VictimStatus,
}

// ---------------------------------------------------------------------------
// Environment and alerts
// ---------------------------------------------------------------------------

/// A weather observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Sustained wind speed in km/h.
    pub wind_speed_kmh: u32,
    /// Rainfall over the last hour in millimetres.
    pub rainfall_mm: u32,
}

/// A seismic observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeismicReading {
    /// Moment magnitude in tenths (65 = M6.5).
    pub magnitude_tenths: u32,
}

/// One batch of environmental data from sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    /// Weather data, if the batch carries any.
    #[serde(default)]
    pub weather: Option<WeatherReading>,
    /// Seismic data, if the batch carries any.
    #[serde(default)]
    pub seismic: Option<SeismicReading>,
}

/// A broadcast alert. Ephemeral: its identity is the message carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Open-ended alert kind (e.g. `weather_impact`, `seismic_risk`).
    pub kind: String,
    /// How severe the predicted impact is.
    pub severity: RiskLevel,
    /// Human-readable summary.
    pub message: String,
    /// Areas the alert concerns.
    #[serde(default)]
    pub areas_affected: Vec<String>,
    /// Suggested responses.
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}
