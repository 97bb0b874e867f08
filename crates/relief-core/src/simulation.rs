//! The simulation driver.
//!
//! A [`Simulation`] owns one broker, one shared context and the four agents,
//! and subscribes each agent to the topics it reacts to:
//!
//! | Agent | Topics |
//! |-------|--------|
//! | analytics | `assessment_request`, `environmental_data` |
//! | relief coordinator | `assessment_ready` |
//! | volunteer coordinator | `allocation_plan`, `volunteer_registered`, `task_completed` |
//! | communication | `victim_request`, `rescue_team_location_update`, `prediction_alert`, custom `*_alert` |
//!
//! Nothing subscribes to `assignment`, `rescue_needed` or `alerts`; those are
//! outputs for whoever drives the simulation and stay visible in the
//! broker journal.
//!
//! Driver helpers publish with the `driver` sender id. Each helper returns
//! once the whole reaction cascade has been delivered.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use relief_agents::{AnalyticsAgent, CommunicationAgent, ReliefCoordinator, VolunteerCoordinator};
use relief_broker::{MessageBroker, PublishReport, SharedSubscriber};
use relief_types::{
    AgentId, AreaSurvey, EnvironmentalReading, GeoPoint, Message, Payload, Resource, Severity,
    Skill, TaskId, TaskStatus, TeamId, Topic, Urgency, VictimStatus, VolunteerId,
};
use relief_world::DisasterContext;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{DisasterConfig, SimulationConfig};
use crate::error::SimulationError;

/// Topics the analytics agent listens on.
pub const ANALYTICS_TOPICS: [Topic; 2] = [Topic::AssessmentRequest, Topic::EnvironmentalData];

/// Topics the relief coordinator listens on.
pub const RELIEF_TOPICS: [Topic; 1] = [Topic::AssessmentReady];

/// Topics the volunteer coordinator listens on.
pub const VOLUNTEER_TOPICS: [Topic; 3] = [
    Topic::AllocationPlan,
    Topic::VolunteerRegistered,
    Topic::TaskCompleted,
];

/// Fixed topics the communication agent listens on.
pub const COMMUNICATION_TOPICS: [Topic; 3] = [
    Topic::VictimRequest,
    Topic::RescueTeamLocationUpdate,
    Topic::PredictionAlert,
];

/// A fully wired broker, context and agent set.
pub struct Simulation {
    broker: Arc<MessageBroker>,
    context: Arc<DisasterContext>,
    relief: Arc<Mutex<ReliefCoordinator>>,
    volunteers: Arc<Mutex<VolunteerCoordinator>>,
    communication: Arc<Mutex<CommunicationAgent>>,
    analytics: Arc<Mutex<AnalyticsAgent>>,
}

/// Point-in-time counts across the agents, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    /// Areas with an assessment in the context.
    pub areas_assessed: usize,
    /// Allocation plans committed.
    pub plans: usize,
    /// Total units allocated across all resources.
    pub units_allocated: u64,
    /// Whether the pool still satisfies `available + allocated == initial`.
    pub pool_balanced: bool,
    /// Registered volunteers.
    pub volunteers: usize,
    /// Tasks waiting for a volunteer.
    pub tasks_pending: usize,
    /// Tasks held by a volunteer.
    pub tasks_assigned: usize,
    /// Finished tasks.
    pub tasks_completed: usize,
    /// Known rescue teams.
    pub teams: usize,
    /// Victim requests received.
    pub victims: usize,
    /// Victim requests with a dispatched team.
    pub victims_dispatched: usize,
    /// Alerts raised by analytics.
    pub alerts: usize,
    /// Messages retained in the broker journal.
    pub journal_entries: usize,
}

impl Simulation {
    /// Build the broker, context and agents and subscribe every agent.
    ///
    /// The disaster is not declared yet; call [`Simulation::declare`].
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let broker = Arc::new(MessageBroker::with_config(config.broker.into()));
        let context = Arc::new(DisasterContext::new());
        let writer = context.assessment_writer()?;

        let simulation = Self {
            relief: Arc::new(Mutex::new(ReliefCoordinator::new(
                Arc::clone(&context),
                &config.resources,
            ))),
            volunteers: Arc::new(Mutex::new(VolunteerCoordinator::new())),
            communication: Arc::new(Mutex::new(CommunicationAgent::new(config.communication))),
            analytics: Arc::new(Mutex::new(AnalyticsAgent::new(
                writer,
                config.analytics.clone(),
            ))),
            broker,
            context,
        };
        simulation.wire(&config.routing.custom_alert_topics)?;
        Ok(simulation)
    }

    fn wire(&self, custom_alert_topics: &[String]) -> Result<(), SimulationError> {
        let analytics: SharedSubscriber = self.analytics.clone();
        let relief: SharedSubscriber = self.relief.clone();
        let volunteers: SharedSubscriber = self.volunteers.clone();
        let communication: SharedSubscriber = self.communication.clone();

        for topic in ANALYTICS_TOPICS {
            self.broker.subscribe(topic, Arc::clone(&analytics))?;
        }
        for topic in RELIEF_TOPICS {
            self.broker.subscribe(topic, Arc::clone(&relief))?;
        }
        for topic in VOLUNTEER_TOPICS {
            self.broker.subscribe(topic, Arc::clone(&volunteers))?;
        }
        for topic in COMMUNICATION_TOPICS {
            self.broker.subscribe(topic, Arc::clone(&communication))?;
        }
        for name in custom_alert_topics {
            let topic: Topic = name.parse()?;
            if !topic.is_alert_source() {
                warn!(topic = %topic, "Not an alert topic, skipping relay subscription");
                continue;
            }
            self.broker.subscribe(topic, Arc::clone(&communication))?;
        }
        info!(
            custom_alert_topics = custom_alert_topics.len(),
            "Agents subscribed"
        );
        Ok(())
    }

    /// Declare the configured disaster.
    pub fn declare(&self, disaster: &DisasterConfig) -> Result<(), SimulationError> {
        let severity = Severity::from_scale(disaster.severity)?;
        self.context
            .initialize(disaster.disaster_type.clone(), disaster.location.clone(), severity)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Driver helpers
    // -----------------------------------------------------------------------

    /// Publish a payload on `topic` as the driver.
    pub fn publish(&self, topic: Topic, payload: Payload) -> Result<PublishReport, SimulationError> {
        Ok(self
            .broker
            .publish(Message::new(topic, AgentId::driver(), payload))?)
    }

    /// Publish a loosely-typed JSON payload as the driver.
    ///
    /// The payload must use the `{"kind": ..., "data": ...}` envelope.
    pub fn publish_json(
        &self,
        topic: &str,
        payload: serde_json::Value,
    ) -> Result<PublishReport, SimulationError> {
        let message = Message::from_json(topic, AgentId::driver(), payload)?;
        Ok(self.broker.publish(message)?)
    }

    /// Ask analytics to assess `areas` (or the configured areas when empty).
    pub fn request_assessment(&self, areas: Vec<AreaSurvey>) -> Result<PublishReport, SimulationError> {
        self.publish(Topic::AssessmentRequest, Payload::AssessmentRequest { areas })
    }

    /// Register a volunteer.
    pub fn register_volunteer(
        &self,
        volunteer_id: VolunteerId,
        skills: BTreeSet<Skill>,
    ) -> Result<PublishReport, SimulationError> {
        self.publish(
            Topic::VolunteerRegistered,
            Payload::VolunteerRegistered {
                volunteer_id,
                skills,
            },
        )
    }

    /// Report a task as done.
    pub fn complete_task(&self, task_id: TaskId) -> Result<PublishReport, SimulationError> {
        self.publish(Topic::TaskCompleted, Payload::TaskCompleted { task_id })
    }

    /// Report a victim calling for help.
    pub fn report_victim(
        &self,
        location: GeoPoint,
        description: impl Into<String>,
        reported_urgency: Urgency,
    ) -> Result<PublishReport, SimulationError> {
        self.publish(
            Topic::VictimRequest,
            Payload::VictimRequest {
                location,
                description: description.into(),
                reported_urgency,
            },
        )
    }

    /// Report a rescue team position.
    pub fn update_team_location(
        &self,
        team_id: TeamId,
        location: GeoPoint,
    ) -> Result<PublishReport, SimulationError> {
        self.publish(
            Topic::RescueTeamLocationUpdate,
            Payload::RescueTeamLocation { team_id, location },
        )
    }

    /// Feed a sensor reading to analytics.
    pub fn report_environment(
        &self,
        reading: EnvironmentalReading,
    ) -> Result<PublishReport, SimulationError> {
        self.publish(Topic::EnvironmentalData, Payload::EnvironmentalData(reading))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The broker.
    pub const fn broker(&self) -> &Arc<MessageBroker> {
        &self.broker
    }

    /// The shared disaster context.
    pub const fn context(&self) -> &Arc<DisasterContext> {
        &self.context
    }

    /// Lock the relief coordinator.
    pub fn relief(&self) -> Result<MutexGuard<'_, ReliefCoordinator>, SimulationError> {
        lock(&self.relief, "relief_coordinator")
    }

    /// Lock the volunteer coordinator.
    pub fn volunteers(&self) -> Result<MutexGuard<'_, VolunteerCoordinator>, SimulationError> {
        lock(&self.volunteers, "volunteer_coordinator")
    }

    /// Lock the communication agent.
    pub fn communication(&self) -> Result<MutexGuard<'_, CommunicationAgent>, SimulationError> {
        lock(&self.communication, "communication")
    }

    /// Lock the analytics agent.
    pub fn analytics(&self) -> Result<MutexGuard<'_, AnalyticsAgent>, SimulationError> {
        lock(&self.analytics, "analytics")
    }

    /// Count what every agent holds right now.
    pub fn summary(&self) -> Result<SimulationSummary, SimulationError> {
        let mut summary = SimulationSummary {
            areas_assessed: self.context.snapshot()?.affected_areas.len(),
            journal_entries: self.broker.journal()?.len(),
            ..SimulationSummary::default()
        };
        {
            let relief = self.relief()?;
            summary.plans = relief.plans().len();
            summary.units_allocated = Resource::ALL
                .iter()
                .map(|r| u64::from(relief.pool().allocated(*r)))
                .sum();
            summary.pool_balanced = relief.pool().is_balanced();
        }
        {
            let volunteers = self.volunteers()?;
            summary.volunteers = volunteers.volunteers().len();
            for task in volunteers.tasks() {
                let counter = match task.status {
                    TaskStatus::Pending => &mut summary.tasks_pending,
                    TaskStatus::Assigned => &mut summary.tasks_assigned,
                    TaskStatus::Completed => &mut summary.tasks_completed,
                };
                *counter = counter.saturating_add(1);
            }
        }
        {
            let communication = self.communication()?;
            summary.teams = communication.teams().len();
            summary.victims = communication.requests().len();
            summary.victims_dispatched = communication
                .requests()
                .iter()
                .filter(|r| matches!(r.status, VictimStatus::Dispatched { .. }))
                .count();
        }
        summary.alerts = self.analytics()?.alerts().len();
        Ok(summary)
    }
}

impl core::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Simulation")
            .field("broker", &self.broker)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

fn lock<'a, T>(
    agent: &'a Mutex<T>,
    name: &'static str,
) -> Result<MutexGuard<'a, T>, SimulationError> {
    agent
        .lock()
        .map_err(|_poisoned| SimulationError::LockPoisoned(name))
}
