//! Broker topics.
//!
//! The topic set is fixed except for alerts: any lowercase name ending in
//! `_alert` is accepted as a custom alert topic so analytics can introduce new
//! alert families without a schema change.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MessageError;
use crate::message::PayloadKind;

/// Suffix shared by every alert topic.
const ALERT_SUFFIX: &str = "_alert";

/// A named channel on the broker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Topic {
    /// Request for area need assessments.
    AssessmentRequest,
    /// Completed set of area assessments.
    AssessmentReady,
    /// One committed (area, resource, quantity) allocation.
    AllocationPlan,
    /// A volunteer joined (or re-joined) the pool.
    VolunteerRegistered,
    /// A task was handed to a volunteer.
    Assignment,
    /// A volunteer finished a task.
    TaskCompleted,
    /// A victim asked for help.
    VictimRequest,
    /// A victim needs a rescue team.
    RescueNeeded,
    /// A rescue team reported its position.
    RescueTeamLocationUpdate,
    /// Sensor readings (weather, seismic).
    EnvironmentalData,
    /// Analytics predicted an impact.
    PredictionAlert,
    /// General alert broadcast channel.
    Alerts,
    /// Any other `*_alert` topic.
    CustomAlert(String),
}

impl Topic {
    /// Every fixed topic, in declaration order.
    pub const FIXED: [Self; 12] = [
        Self::AssessmentRequest,
        Self::AssessmentReady,
        Self::AllocationPlan,
        Self::VolunteerRegistered,
        Self::Assignment,
        Self::TaskCompleted,
        Self::VictimRequest,
        Self::RescueNeeded,
        Self::RescueTeamLocationUpdate,
        Self::EnvironmentalData,
        Self::PredictionAlert,
        Self::Alerts,
    ];

    /// The wire name of the topic.
    pub fn as_str(&self) -> &str {
        match self {
            Self::AssessmentRequest => "assessment_request",
            Self::AssessmentReady => "assessment_ready",
            Self::AllocationPlan => "allocation_plan",
            Self::VolunteerRegistered => "volunteer_registered",
            Self::Assignment => "assignment",
            Self::TaskCompleted => "task_completed",
            Self::VictimRequest => "victim_request",
            Self::RescueNeeded => "rescue_needed",
            Self::RescueTeamLocationUpdate => "rescue_team_location_update",
            Self::EnvironmentalData => "environmental_data",
            Self::PredictionAlert => "prediction_alert",
            Self::Alerts => "alerts",
            Self::CustomAlert(name) => name,
        }
    }

    /// Whether this topic carries alerts that the communication agent relays.
    ///
    /// The general [`Topic::Alerts`] channel is the relay target and is not
    /// itself an alert source.
    pub const fn is_alert_source(&self) -> bool {
        matches!(self, Self::PredictionAlert | Self::CustomAlert(_))
    }

    /// The only payload kind this topic accepts.
    pub const fn expected_kind(&self) -> PayloadKind {
        match self {
            Self::AssessmentRequest => PayloadKind::AssessmentRequest,
            Self::AssessmentReady => PayloadKind::AssessmentReady,
            Self::AllocationPlan => PayloadKind::AllocationPlan,
            Self::VolunteerRegistered => PayloadKind::VolunteerRegistered,
            Self::Assignment => PayloadKind::Assignment,
            Self::TaskCompleted => PayloadKind::TaskCompleted,
            Self::VictimRequest => PayloadKind::VictimRequest,
            Self::RescueNeeded => PayloadKind::RescueNeeded,
            Self::RescueTeamLocationUpdate => PayloadKind::RescueTeamLocation,
            Self::EnvironmentalData => PayloadKind::EnvironmentalData,
            Self::PredictionAlert | Self::Alerts | Self::CustomAlert(_) => PayloadKind::Alert,
        }
    }
}

impl FromStr for Topic {
    type Err = MessageError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if let Some(fixed) = Self::FIXED.iter().find(|t| t.as_str() == name) {
            return Ok(fixed.clone());
        }
        let well_formed = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        let has_prefix = name.len() > ALERT_SUFFIX.len();
        if well_formed && has_prefix && name.ends_with(ALERT_SUFFIX) {
            return Ok(Self::CustomAlert(name.to_owned()));
        }
        Err(MessageError::UnknownTopic(name.to_owned()))
    }
}

impl TryFrom<String> for Topic {
    type Error = MessageError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.as_str().to_owned()
    }
}

impl core::fmt::Display for Topic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
