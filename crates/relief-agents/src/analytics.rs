//! Analytics agent: need assessment and environmental risk prediction.
//!
//! # Assessment
//!
//! On `assessment_request` every area gets an [`AreaAssessment`]. Field
//! surveys in the request win; anything they leave out is generated:
//!
//! - needs: `random_range(need_min..=need_max) * severity weight` for each
//!   configured need resource, drawn from a seeded [`StdRng`]
//! - urgency: `clamp(2 * severity weight + risk / 5 - rank, 0, 10)` where
//!   `rank` is the zero-based position of the area in the request
//!
//! Assessments are recorded in the shared context before `assessment_ready`
//! is published. An area named twice in one request keeps its first rank and
//! its last survey, so the published set matches the context.
//!
//! # Prediction
//!
//! Each signal keeps a sliding window of its most recent readings.
//!
//! | Signal | Risk |
//! |--------|------|
//! | weather | `min(10, avg_wind_kmh / 10 + avg_rain_mm / 50)` |
//! | seismic | `min(10, avg_magnitude_tenths / 10)` |
//!
//! The stronger signal names the prediction (seismic wins ties). A risk above
//! the alert threshold is published as an [`Alert`] on `prediction_alert`,
//! but only when the dominant signal was part of the incoming reading: a
//! weather-only reading never re-raises an alert from an older quake.

use std::collections::{BTreeMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relief_broker::{DeliveryError, Subscriber};
use relief_types::{
    AgentId, Alert, AreaAssessment, AreaSurvey, DisasterDeclaration, EnvironmentalReading,
    Message, Payload, Resource, RiskLevel, SeismicReading, Topic, Urgency, WeatherReading,
};
use relief_world::AssessmentWriter;
use tracing::{debug, info, warn};

use crate::config::AnalyticsConfig;
use crate::error::AgentError;

/// Alert kind raised by the weather signal.
pub const WEATHER_IMPACT: &str = "weather_impact";

/// Alert kind raised by the seismic signal.
pub const SEISMIC_RISK: &str = "seismic_risk";

/// The dominant risk signal after the latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    /// [`WEATHER_IMPACT`] or [`SEISMIC_RISK`].
    pub kind: &'static str,
    /// Risk level of the dominant signal.
    pub level: RiskLevel,
}

/// Produces assessments and risk predictions. Holds the context writer.
pub struct AnalyticsAgent {
    id: AgentId,
    writer: AssessmentWriter,
    config: AnalyticsConfig,
    rng: StdRng,
    weather: VecDeque<WeatherReading>,
    seismic: VecDeque<SeismicReading>,
    alerts: Vec<Alert>,
}

impl AnalyticsAgent {
    /// Create an agent that records through `writer`.
    pub fn new(writer: AssessmentWriter, config: AnalyticsConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            id: AgentId::analytics(),
            writer,
            config,
            rng,
            weather: VecDeque::new(),
            seismic: VecDeque::new(),
            alerts: Vec::new(),
        }
    }

    /// Alerts raised so far, oldest first.
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Assess every requested area and publish `assessment_ready`.
    ///
    /// An empty survey list assesses the configured areas.
    pub fn assess(&mut self, surveys: &[AreaSurvey]) -> Result<Vec<Message>, AgentError> {
        let declaration = self
            .writer
            .context()
            .declaration()
            .cloned()
            .ok_or(AgentError::DisasterNotDeclared)?;
        let weight = declaration.severity.weight();
        let risk = self.prediction().map(|p| p.level).unwrap_or_default();

        let surveys = if surveys.is_empty() {
            self.configured_areas(&declaration)
        } else {
            surveys.to_vec()
        };

        let mut assessments: Vec<AreaAssessment> = Vec::with_capacity(surveys.len());
        for (rank, survey) in surveys.into_iter().enumerate() {
            let needs = survey
                .needs
                .unwrap_or_else(|| self.generate_needs(weight));
            let urgency = survey
                .urgency
                .unwrap_or_else(|| urgency_score(weight, risk, rank));
            let assessment = AreaAssessment {
                area_name: survey.area_name,
                needs,
                urgency,
            };
            self.writer.record_assessment(assessment.clone())?;
            if let Some(earlier) = assessments
                .iter_mut()
                .find(|a| a.area_name == assessment.area_name)
            {
                debug!(area = %assessment.area_name, "Area surveyed twice, keeping the last survey");
                *earlier = assessment;
            } else {
                assessments.push(assessment);
            }
        }

        info!(
            disaster_type = %declaration.disaster_type,
            location = %declaration.location,
            areas = assessments.len(),
            risk = %risk,
            "Affected areas assessed"
        );
        Ok(vec![Message::new(
            Topic::AssessmentReady,
            self.id.clone(),
            Payload::AssessmentReady { assessments },
        )])
    }

    /// Fold in a sensor reading and alert if the risk crosses the threshold.
    pub fn observe(&mut self, reading: &EnvironmentalReading) -> Result<Vec<Message>, AgentError> {
        self.writer.record_environment(reading)?;
        let window = self.config.window.max(1);
        if let Some(weather) = reading.weather {
            push_bounded(&mut self.weather, weather, window);
        }
        if let Some(seismic) = reading.seismic {
            push_bounded(&mut self.seismic, seismic, window);
        }

        let Some(prediction) = self.prediction() else {
            debug!("Empty environmental reading");
            return Ok(Vec::new());
        };
        info!(kind = prediction.kind, risk = %prediction.level, "Prediction generated");

        if prediction.level.value() <= self.config.alert_threshold {
            return Ok(Vec::new());
        }
        let fresh = if prediction.kind == SEISMIC_RISK {
            reading.seismic.is_some()
        } else {
            reading.weather.is_some()
        };
        if !fresh {
            debug!(kind = prediction.kind, "Dominant signal not in this reading, no alert");
            return Ok(Vec::new());
        }

        let alert = Alert {
            kind: prediction.kind.to_owned(),
            severity: prediction.level,
            message: format!("High risk detected: {}", prediction.level),
            areas_affected: self.affected_area_names()?,
            recommended_actions: recommended_actions(prediction.kind),
        };
        warn!(
            kind = %alert.kind,
            risk = %alert.severity,
            areas = alert.areas_affected.len(),
            "Risk above threshold, raising alert"
        );
        self.alerts.push(alert.clone());
        Ok(vec![Message::new(
            Topic::PredictionAlert,
            self.id.clone(),
            Payload::Alert(alert),
        )])
    }

    /// The dominant signal over the current windows, if any reading exists.
    pub fn prediction(&self) -> Option<Prediction> {
        let weather = weather_risk(&self.weather).map(|level| Prediction {
            kind: WEATHER_IMPACT,
            level,
        });
        let seismic = seismic_risk(&self.seismic).map(|level| Prediction {
            kind: SEISMIC_RISK,
            level,
        });
        match (weather, seismic) {
            (Some(w), Some(s)) if w.level > s.level => Some(w),
            (_, Some(s)) => Some(s),
            (w, None) => w,
        }
    }

    fn configured_areas(&self, declaration: &DisasterDeclaration) -> Vec<AreaSurvey> {
        if self.config.areas.is_empty() {
            (1..=self.config.area_count)
                .map(|i| AreaSurvey::named(format!("{}_Area_{i}", declaration.location)))
                .collect()
        } else {
            self.config.areas.iter().map(AreaSurvey::named).collect()
        }
    }

    fn generate_needs(&mut self, weight: u32) -> BTreeMap<Resource, u32> {
        let low = self.config.need_min.min(self.config.need_max);
        let high = self.config.need_min.max(self.config.need_max);
        self.config
            .need_resources
            .iter()
            .map(|resource| {
                let base: u32 = self.rng.random_range(low..=high);
                (*resource, base.saturating_mul(weight))
            })
            .collect()
    }

    fn affected_area_names(&self) -> Result<Vec<String>, AgentError> {
        Ok(self
            .writer
            .context()
            .snapshot()?
            .affected_areas
            .into_iter()
            .map(|area| area.area_name)
            .collect())
    }
}

impl core::fmt::Debug for AnalyticsAgent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnalyticsAgent")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("weather", &self.weather.len())
            .field("seismic", &self.seismic.len())
            .field("alerts", &self.alerts.len())
            .finish_non_exhaustive()
    }
}

impl Subscriber for AnalyticsAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
        let result = match message.payload() {
            Payload::AssessmentRequest { areas } => self.assess(areas),
            Payload::EnvironmentalData(reading) => self.observe(reading),
            other => Err(AgentError::UnexpectedPayload {
                topic: message.topic().clone(),
                actual: other.kind(),
            }),
        };
        result.map_err(|e| e.into_delivery(&self.id, message.topic()))
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// `clamp(2 * weight + risk / 5 - rank, 0, 10)`.
fn urgency_score(weight: u32, risk: RiskLevel, rank: usize) -> Urgency {
    let rank = i64::try_from(rank).unwrap_or(i64::MAX);
    let score = i64::from(weight)
        .saturating_mul(2)
        .saturating_add(i64::from(risk.value() / 5))
        .saturating_sub(rank);
    Urgency::saturating(score)
}

fn push_bounded<T>(window: &mut VecDeque<T>, value: T, capacity: usize) {
    window.push_back(value);
    while window.len() > capacity {
        window.pop_front();
    }
}

fn average(values: impl Iterator<Item = u32>, count: usize) -> u64 {
    let total: u64 = values.map(u64::from).sum();
    total.checked_div(u64::try_from(count).unwrap_or(u64::MAX)).unwrap_or(0)
}

fn weather_risk(window: &VecDeque<WeatherReading>) -> Option<RiskLevel> {
    if window.is_empty() {
        return None;
    }
    let wind = average(window.iter().map(|r| r.wind_speed_kmh), window.len());
    let rain = average(window.iter().map(|r| r.rainfall_mm), window.len());
    let risk = (wind / 10).saturating_add(rain / 50);
    Some(RiskLevel::capped(u32::try_from(risk).unwrap_or(u32::MAX)))
}

fn seismic_risk(window: &VecDeque<SeismicReading>) -> Option<RiskLevel> {
    if window.is_empty() {
        return None;
    }
    let magnitude = average(window.iter().map(|r| r.magnitude_tenths), window.len());
    Some(RiskLevel::capped(u32::try_from(magnitude / 10).unwrap_or(u32::MAX)))
}

fn recommended_actions(kind: &str) -> Vec<String> {
    let actions: &[&str] = if kind == SEISMIC_RISK {
        &[
            "Inspect damaged structures",
            "Deploy additional rescue teams",
            "Prepare for aftershocks",
        ]
    } else {
        &["Evacuate high-risk areas", "Deploy additional rescue teams"]
    };
    actions.iter().map(|a| (*a).to_owned()).collect()
}
