//! The shared disaster context.
//!
//! One [`DisasterContext`] exists per simulation run and is injected into the
//! agents as an `Arc`. Field ownership is split:
//!
//! | Field | Written by | When |
//! |-------|-----------|------|
//! | declaration (type, location, severity) | driver | once, via [`DisasterContext::initialize`] |
//! | affected areas | analytics | via the [`AssessmentWriter`] |
//! | environment snapshot | analytics | via the [`AssessmentWriter`] |
//!
//! Readers that must reason over a consistent view take a
//! [`ContextSnapshot`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use relief_types::{AreaAssessment, DisasterDeclaration, EnvironmentalReading, Severity};
use serde::Serialize;
use tracing::{debug, info};

use crate::environment::EnvironmentSnapshot;
use crate::error::ContextError;

/// Shared, internally synchronized disaster state.
#[derive(Debug, Default)]
pub struct DisasterContext {
    /// Set exactly once at declaration.
    declaration: OnceLock<DisasterDeclaration>,
    /// Current assessments keyed by area name.
    affected_areas: RwLock<BTreeMap<String, AreaAssessment>>,
    /// Latest environmental conditions.
    environment: RwLock<EnvironmentSnapshot>,
    /// Whether the single writer capability has been handed out.
    writer_claimed: AtomicBool,
}

/// Immutable copy of the context at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSnapshot {
    /// The declaration, if the disaster has been declared.
    pub declaration: Option<DisasterDeclaration>,
    /// Assessments ordered by area name.
    pub affected_areas: Vec<AreaAssessment>,
    /// Latest environmental conditions.
    pub environment: EnvironmentSnapshot,
}

impl DisasterContext {
    /// Create an undeclared context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the disaster.
    ///
    /// Succeeds exactly once. Later calls fail with
    /// [`ContextError::AlreadyInitialized`] and leave the first declaration
    /// untouched.
    pub fn initialize(
        &self,
        disaster_type: impl Into<String>,
        location: impl Into<String>,
        severity: Severity,
    ) -> Result<(), ContextError> {
        let declaration = DisasterDeclaration {
            disaster_type: disaster_type.into(),
            location: location.into(),
            severity,
        };
        match self.declaration.set(declaration) {
            Ok(()) => {
                if let Some(declared) = self.declaration.get() {
                    info!(
                        disaster_type = %declared.disaster_type,
                        location = %declared.location,
                        severity = ?declared.severity,
                        "Disaster declared"
                    );
                }
                Ok(())
            }
            Err(rejected) => {
                let standing = self.declaration.get().unwrap_or(&rejected);
                Err(ContextError::AlreadyInitialized {
                    disaster_type: standing.disaster_type.clone(),
                    location: standing.location.clone(),
                })
            }
        }
    }

    /// The declaration, if the disaster has been declared.
    pub fn declaration(&self) -> Option<&DisasterDeclaration> {
        self.declaration.get()
    }

    /// Declared severity, if any.
    pub fn severity(&self) -> Option<Severity> {
        self.declaration.get().map(|d| d.severity)
    }

    /// Claim the single writer capability for assessments and environment.
    ///
    /// Fails with [`ContextError::WriterAlreadyClaimed`] on every call after
    /// the first.
    pub fn assessment_writer(self: &Arc<Self>) -> Result<AssessmentWriter, ContextError> {
        if self.writer_claimed.swap(true, Ordering::AcqRel) {
            return Err(ContextError::WriterAlreadyClaimed);
        }
        Ok(AssessmentWriter {
            context: Arc::clone(self),
        })
    }

    /// Current assessment for an area.
    pub fn assessment(&self, area_name: &str) -> Result<Option<AreaAssessment>, ContextError> {
        let areas = self
            .affected_areas
            .read()
            .map_err(|_poisoned| ContextError::LockPoisoned("affected_areas"))?;
        Ok(areas.get(area_name).cloned())
    }

    /// Take an immutable copy of the whole context.
    pub fn snapshot(&self) -> Result<ContextSnapshot, ContextError> {
        let affected_areas = self
            .affected_areas
            .read()
            .map_err(|_poisoned| ContextError::LockPoisoned("affected_areas"))?
            .values()
            .cloned()
            .collect();
        let environment = *self
            .environment
            .read()
            .map_err(|_poisoned| ContextError::LockPoisoned("environment"))?;
        Ok(ContextSnapshot {
            declaration: self.declaration.get().cloned(),
            affected_areas,
            environment,
        })
    }
}

/// The single capability allowed to mutate affected areas and the
/// environment snapshot. Held by the analytics agent.
#[derive(Debug)]
pub struct AssessmentWriter {
    context: Arc<DisasterContext>,
}

impl AssessmentWriter {
    /// Insert or replace the assessment for `area.area_name`.
    ///
    /// Returns the assessment that was replaced, if any.
    pub fn record_assessment(
        &self,
        area: AreaAssessment,
    ) -> Result<Option<AreaAssessment>, ContextError> {
        let mut areas = self
            .context
            .affected_areas
            .write()
            .map_err(|_poisoned| ContextError::LockPoisoned("affected_areas"))?;
        debug!(area = %area.area_name, urgency = %area.urgency, "Recording assessment");
        Ok(areas.insert(area.area_name.clone(), area))
    }

    /// Fold an environmental reading into the snapshot.
    pub fn record_environment(&self, reading: &EnvironmentalReading) -> Result<(), ContextError> {
        self.context
            .environment
            .write()
            .map_err(|_poisoned| ContextError::LockPoisoned("environment"))?
            .apply(reading);
        Ok(())
    }

    /// The context this writer mutates.
    pub const fn context(&self) -> &Arc<DisasterContext> {
        &self.context
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use relief_types::{Resource, Urgency, WeatherReading};

    use super::*;

    fn assessment(name: &str, food: u32, urgency: u8) -> AreaAssessment {
        AreaAssessment {
            area_name: name.to_owned(),
            needs: BTreeMap::from([(Resource::Food, food)]),
            urgency: Urgency::new(urgency).unwrap(),
        }
    }

    #[test]
    fn initialize_once() {
        let context = DisasterContext::new();
        assert!(context.severity().is_none());
        let first = context.initialize("earthquake", "LA", Severity::Severe);
        assert!(first.is_ok());
        assert_eq!(context.severity(), Some(Severity::Severe));
    }

    #[test]
    fn second_initialize_fails_and_keeps_first_values() {
        let context = DisasterContext::new();
        context.initialize("earthquake", "LA", Severity::Severe).unwrap();
        let second = context.initialize("flood", "Houston", Severity::Minor);

        assert!(matches!(
            second,
            Err(ContextError::AlreadyInitialized { ref disaster_type, .. }) if disaster_type == "earthquake"
        ));
        let declared = context.declaration().cloned();
        assert_eq!(declared.as_ref().map(|d| d.location.as_str()), Some("LA"));
        assert_eq!(declared.map(|d| d.severity), Some(Severity::Severe));
    }

    #[test]
    fn writer_can_only_be_claimed_once() {
        let context = Arc::new(DisasterContext::new());
        assert!(context.assessment_writer().is_ok());
        assert!(matches!(
            context.assessment_writer(),
            Err(ContextError::WriterAlreadyClaimed)
        ));
    }

    #[test]
    fn record_assessment_replaces_by_area_name() {
        let context = Arc::new(DisasterContext::new());
        let writer = context.assessment_writer().unwrap();

        let first = writer.record_assessment(assessment("LA_Area_1", 100, 3));
        assert_eq!(first.ok(), Some(None));
        let replaced = writer.record_assessment(assessment("LA_Area_1", 500, 9));
        assert_eq!(
            replaced.ok().flatten().map(|a| a.needs.get(&Resource::Food).copied()),
            Some(Some(100))
        );

        let snapshot = context.snapshot();
        let areas = snapshot.unwrap().affected_areas;
        assert_eq!(areas.len(), 1);
        assert_eq!(areas.first().map(|a| a.urgency.value()), Some(9));
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let context = Arc::new(DisasterContext::new());
        let writer = context.assessment_writer().unwrap();
        writer.record_assessment(assessment("A", 1, 1)).unwrap();
        let before = context.snapshot();

        writer.record_assessment(assessment("B", 2, 2)).unwrap();
        writer
            .record_environment(&EnvironmentalReading {
                weather: Some(WeatherReading {
                    wind_speed_kmh: 80,
                    rainfall_mm: 0,
                }),
                seismic: None,
            })
            .unwrap();

        let before = before.map(|s| (s.affected_areas.len(), s.environment.batches_seen));
        assert_eq!(before.ok(), Some((1, 0)));
        let after = context
            .snapshot()
            .map(|s| (s.affected_areas.len(), s.environment.batches_seen));
        assert_eq!(after.ok(), Some((2, 1)));
    }
}
