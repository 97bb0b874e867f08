//! Enumeration types and bounded scales for the disaster response simulation.
//!
//! Scales that arrive from the outside world (urgency, risk) are validated on
//! construction and deserialization, so a value held in one of these types is
//! always within range.

use serde::{Deserialize, Serialize};

use crate::error::ScaleError;

// ---------------------------------------------------------------------------
// Disaster severity
// ---------------------------------------------------------------------------

/// Ordered disaster severity, fixed at declaration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Localized damage, routine response (scale 1-2).
    Minor,
    /// Several neighbourhoods affected (scale 3-4).
    Moderate,
    /// City-wide disruption (scale 5-6).
    Major,
    /// Regional emergency (scale 7-8).
    Severe,
    /// Overwhelming damage across the region (scale 9-10).
    Catastrophic,
}

impl Severity {
    /// Lowest value accepted on the declaration scale.
    pub const SCALE_MIN: u8 = 1;
    /// Highest value accepted on the declaration scale.
    pub const SCALE_MAX: u8 = 10;

    /// Map a 1-10 declaration scale onto the severity enumeration.
    ///
    /// Each severity covers two consecutive scale points.
    pub const fn from_scale(value: u8) -> Result<Self, ScaleError> {
        match value {
            1 | 2 => Ok(Self::Minor),
            3 | 4 => Ok(Self::Moderate),
            5 | 6 => Ok(Self::Major),
            7 | 8 => Ok(Self::Severe),
            9 | 10 => Ok(Self::Catastrophic),
            _ => Err(ScaleError::OutOfRange {
                scale: "severity",
                value: value as u32,
                min: Self::SCALE_MIN as u32,
                max: Self::SCALE_MAX as u32,
            }),
        }
    }

    /// Multiplier applied to area urgency when computing allocation priority.
    pub const fn weight(self) -> u32 {
        match self {
            Self::Minor => 1,
            Self::Moderate => 2,
            Self::Major => 3,
            Self::Severe => 4,
            Self::Catastrophic => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Urgency, priority and risk scales
// ---------------------------------------------------------------------------

/// Per-area or per-request urgency on a 0-10 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Urgency(u8);

impl Urgency {
    /// Highest urgency.
    pub const MAX: Self = Self(10);
    /// No urgency at all.
    pub const NONE: Self = Self(0);

    /// Validate a raw urgency value.
    pub const fn new(value: u8) -> Result<Self, ScaleError> {
        if value > Self::MAX.0 {
            return Err(ScaleError::OutOfRange {
                scale: "urgency",
                value: value as u32,
                min: 0,
                max: Self::MAX.0 as u32,
            });
        }
        Ok(Self(value))
    }

    /// Build an urgency from any integer, clamping into range.
    pub fn saturating(value: i64) -> Self {
        let clamped = value.clamp(0, i64::from(Self::MAX.0));
        Self(u8::try_from(clamped).unwrap_or(Self::MAX.0))
    }

    /// Return the raw value.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Urgency {
    type Error = ScaleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Urgency> for u8 {
    fn from(urgency: Urgency) -> Self {
        urgency.0
    }
}

impl core::fmt::Display for Urgency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

/// Allocation priority: area urgency multiplied by the severity weight.
///
/// Ranges over 0-50. Tasks inherit the priority of the plan they were
/// synthesized from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(u32);

impl Priority {
    /// Compute `urgency * severity.weight()`.
    pub fn of(urgency: Urgency, severity: Severity) -> Self {
        Self(u32::from(urgency.value()).saturating_mul(severity.weight()))
    }

    /// Wrap a raw priority value.
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Return the raw value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for Priority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk level derived by analytics on a 0-10 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RiskLevel(u8);

impl RiskLevel {
    /// Highest risk level.
    pub const MAX: Self = Self(10);

    /// Validate a raw risk value.
    pub const fn new(value: u8) -> Result<Self, ScaleError> {
        if value > Self::MAX.0 {
            return Err(ScaleError::OutOfRange {
                scale: "risk level",
                value: value as u32,
                min: 0,
                max: Self::MAX.0 as u32,
            });
        }
        Ok(Self(value))
    }

    /// Build a risk level from any unsigned integer, capping at [`RiskLevel::MAX`].
    pub fn capped(value: u32) -> Self {
        let capped = value.min(u32::from(Self::MAX.0));
        Self(u8::try_from(capped).unwrap_or(Self::MAX.0))
    }

    /// Return the raw value.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RiskLevel {
    type Error = ScaleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RiskLevel> for u8 {
    fn from(risk: RiskLevel) -> Self {
        risk.0
    }
}

impl core::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

// ---------------------------------------------------------------------------
// Resources and skills
// ---------------------------------------------------------------------------

/// A relief resource held in the coordinator's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Food rations.
    Food,
    /// Drinking water (litres).
    Water,
    /// First-aid and medical supplies.
    MedicalSupplies,
    /// Emergency shelter kits.
    ShelterKits,
    /// Blankets.
    Blankets,
}

impl Resource {
    /// Every resource, in pool order.
    pub const ALL: [Self; 5] = [
        Self::Food,
        Self::Water,
        Self::MedicalSupplies,
        Self::ShelterKits,
        Self::Blankets,
    ];

    /// The `snake_case` name used in payloads and configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Water => "water",
            Self::MedicalSupplies => "medical_supplies",
            Self::ShelterKits => "shelter_kits",
            Self::Blankets => "blankets",
        }
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A volunteer skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    /// Medical care and triage.
    Medical,
    /// Transport and distribution of goods.
    Logistics,
    /// Search and rescue.
    Rescue,
    /// Radio and public information.
    Communication,
    /// Structural work and shelter construction.
    Engineering,
}

impl Skill {
    /// Every skill.
    pub const ALL: [Self; 5] = [
        Self::Medical,
        Self::Logistics,
        Self::Rescue,
        Self::Communication,
        Self::Engineering,
    ];
}

impl core::fmt::Display for Skill {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Medical => "medical",
            Self::Logistics => "logistics",
            Self::Rescue => "rescue",
            Self::Communication => "communication",
            Self::Engineering => "engineering",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Lifecycles
// ---------------------------------------------------------------------------

/// Lifecycle of a distribution task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for a qualified volunteer.
    Pending,
    /// Handed to a volunteer.
    Assigned,
    /// Reported done.
    Completed,
}
