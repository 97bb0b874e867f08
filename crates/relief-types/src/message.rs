//! Messages exchanged through the broker.
//!
//! Every message carries a [`Payload`], a tagged union with one variant per
//! message kind. Each [`Topic`] accepts exactly one payload kind; the broker
//! calls [`Message::validate`] before delivery so a mismatched message never
//! reaches an agent. Loosely-typed JSON from outside the process enters through
//! [`Message::from_json`], which rejects unknown shapes.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Priority, Resource, Skill, Urgency};
use crate::error::MessageError;
use crate::ids::{AgentId, MessageId, TaskId, TeamId, VictimRequestId, VolunteerId};
use crate::structs::{
    Alert, AllocationPlan, AreaAssessment, AreaSurvey, EnvironmentalReading, GeoPoint,
};
use crate::topic::Topic;

/// Body of an `assignment` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentNotice {
    /// The assigned task.
    pub task_id: TaskId,
    /// The volunteer taking the task.
    pub volunteer_id: VolunteerId,
    /// Destination area.
    pub area_name: String,
    /// Resource to distribute.
    pub resource: Resource,
    /// Quantity to distribute.
    pub quantity: u32,
    /// Task urgency.
    pub urgency: Priority,
}

/// Body of a `rescue_needed` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescueDispatch {
    /// The victim request being escalated.
    pub request_id: VictimRequestId,
    /// Where the victim is.
    pub location: GeoPoint,
    /// Free-text description from the caller.
    pub description: String,
    /// Urgency after the proximity boost.
    pub effective_urgency: Urgency,
    /// Nearest rescue team, when one is known.
    pub team: Option<TeamId>,
}

/// Typed message payload, one variant per message kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Ask analytics for need assessments.
    AssessmentRequest {
        /// Optional field surveys; empty means "use configured areas".
        #[serde(default)]
        areas: Vec<AreaSurvey>,
    },
    /// Need assessments for every affected area.
    AssessmentReady {
        /// One assessment per area.
        assessments: Vec<AreaAssessment>,
    },
    /// One committed allocation.
    AllocationPlan(AllocationPlan),
    /// A volunteer registration.
    VolunteerRegistered {
        /// Volunteer identifier.
        volunteer_id: VolunteerId,
        /// Skills the volunteer offers.
        skills: BTreeSet<Skill>,
    },
    /// A task assignment.
    Assignment(AssignmentNotice),
    /// A completed task.
    TaskCompleted {
        /// The finished task.
        task_id: TaskId,
    },
    /// A victim calling for help.
    VictimRequest {
        /// Where the victim is.
        location: GeoPoint,
        /// Free-text description.
        description: String,
        /// Urgency reported by the caller.
        reported_urgency: Urgency,
    },
    /// A victim escalated for rescue.
    RescueNeeded(RescueDispatch),
    /// A rescue team position report.
    RescueTeamLocation {
        /// Reporting team.
        team_id: TeamId,
        /// Current position.
        location: GeoPoint,
    },
    /// Environmental sensor data.
    EnvironmentalData(EnvironmentalReading),
    /// An alert.
    Alert(Alert),
}

/// Discriminant of a [`Payload`], used for schema checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// [`Payload::AssessmentRequest`].
    AssessmentRequest,
    /// [`Payload::AssessmentReady`].
    AssessmentReady,
    /// [`Payload::AllocationPlan`].
    AllocationPlan,
    /// [`Payload::VolunteerRegistered`].
    VolunteerRegistered,
    /// [`Payload::Assignment`].
    Assignment,
    /// [`Payload::TaskCompleted`].
    TaskCompleted,
    /// [`Payload::VictimRequest`].
    VictimRequest,
    /// [`Payload::RescueNeeded`].
    RescueNeeded,
    /// [`Payload::RescueTeamLocation`].
    RescueTeamLocation,
    /// [`Payload::EnvironmentalData`].
    EnvironmentalData,
    /// [`Payload::Alert`].
    Alert,
}

impl Payload {
    /// The discriminant of this payload.
    pub const fn kind(&self) -> PayloadKind {
        match self {
            Self::AssessmentRequest { .. } => PayloadKind::AssessmentRequest,
            Self::AssessmentReady { .. } => PayloadKind::AssessmentReady,
            Self::AllocationPlan(_) => PayloadKind::AllocationPlan,
            Self::VolunteerRegistered { .. } => PayloadKind::VolunteerRegistered,
            Self::Assignment(_) => PayloadKind::Assignment,
            Self::TaskCompleted { .. } => PayloadKind::TaskCompleted,
            Self::VictimRequest { .. } => PayloadKind::VictimRequest,
            Self::RescueNeeded(_) => PayloadKind::RescueNeeded,
            Self::RescueTeamLocation { .. } => PayloadKind::RescueTeamLocation,
            Self::EnvironmentalData(_) => PayloadKind::EnvironmentalData,
            Self::Alert(_) => PayloadKind::Alert,
        }
    }
}

/// An immutable message published on the broker.
///
/// Fields are private: once built, a message can only be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    topic: Topic,
    sender: AgentId,
    payload: Payload,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with a fresh id and the current time.
    ///
    /// No schema check happens here; the broker validates on publish.
    pub fn new(topic: Topic, sender: AgentId, payload: Payload) -> Self {
        Self {
            id: MessageId::new(),
            topic,
            sender,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Build and validate a message from a topic name and a JSON payload.
    ///
    /// The payload must use the `{"kind": ..., "data": ...}` envelope.
    pub fn from_json(
        topic: &str,
        sender: AgentId,
        payload: serde_json::Value,
    ) -> Result<Self, MessageError> {
        let topic: Topic = topic.parse()?;
        let payload: Payload =
            serde_json::from_value(payload).map_err(|source| MessageError::Malformed {
                topic: topic.to_string(),
                source,
            })?;
        let message = Self::new(topic, sender, payload);
        message.validate()?;
        Ok(message)
    }

    /// Check that the payload kind is the one the topic accepts.
    pub fn validate(&self) -> Result<(), MessageError> {
        let expected = self.topic.expected_kind();
        let actual = self.payload.kind();
        if expected == actual {
            Ok(())
        } else {
            Err(MessageError::SchemaMismatch {
                topic: self.topic.clone(),
                expected,
                actual,
            })
        }
    }

    /// Message identifier.
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Topic the message is addressed to.
    pub const fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Agent that published the message.
    pub const fn sender(&self) -> &AgentId {
        &self.sender
    }

    /// Typed payload.
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Creation time.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
