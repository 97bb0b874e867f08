//! End-to-end tests for a fully wired simulation.
//!
//! Each test builds a [`Simulation`] with default configuration, declares
//! the disaster and drives it through the public helpers, then inspects the
//! agents and the broker journal.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use relief_broker::{DeliveryError, Subscriber, shared};
use relief_core::config::{DisasterConfig, SimulationConfig};
use relief_core::{Simulation, scenario};
use relief_types::{
    AgentId, AreaSurvey, EnvironmentalReading, Message, Payload, Resource, SeismicReading, Skill,
    TaskStatus, Topic, Urgency, VolunteerId,
};

fn declared(config: &SimulationConfig) -> Simulation {
    let simulation = Simulation::new(config).unwrap();
    simulation.declare(&config.disaster).unwrap();
    simulation
}

fn skills(list: &[Skill]) -> BTreeSet<Skill> {
    list.iter().copied().collect()
}

/// Collects every message it receives.
struct Listener {
    id: AgentId,
    seen: Vec<Message>,
}

impl Listener {
    fn new(name: &str) -> Self {
        Self {
            id: AgentId::new(name),
            seen: Vec::new(),
        }
    }
}

impl Subscriber for Listener {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
        self.seen.push(message.clone());
        Ok(Vec::new())
    }
}

#[test]
fn los_angeles_earthquake_end_to_end() {
    let config = SimulationConfig {
        disaster: DisasterConfig {
            disaster_type: "earthquake".to_owned(),
            location: "LA".to_owned(),
            severity: 8,
        },
        ..SimulationConfig::default()
    };
    let simulation = declared(&config);

    let survey = AreaSurvey {
        area_name: "LA_Area_1".to_owned(),
        needs: Some(BTreeMap::from([(Resource::Food, 500)])),
        urgency: Some(Urgency::new(9).unwrap()),
    };
    simulation.request_assessment(vec![survey]).unwrap();

    {
        let relief = simulation.relief().unwrap();
        let plans = relief.plans();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].area_name, "LA_Area_1");
        assert_eq!(plans[0].resource, Resource::Food);
        assert_eq!(plans[0].quantity, 500);
        assert_eq!(relief.pool().available(Resource::Food), 500);
    }
    {
        let volunteers = simulation.volunteers().unwrap();
        let tasks = volunteers.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].required_skill, Skill::Logistics);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
    }

    simulation
        .register_volunteer(VolunteerId::new("vol_medic"), skills(&[Skill::Medical]))
        .unwrap();
    assert_eq!(simulation.volunteers().unwrap().pending_count(), 1);

    simulation
        .register_volunteer(
            VolunteerId::new("vol_driver"),
            skills(&[Skill::Logistics, Skill::Rescue]),
        )
        .unwrap();
    {
        let volunteers = simulation.volunteers().unwrap();
        let task = &volunteers.tasks()[0];
        assert_eq!(task.status, TaskStatus::Assigned);
        assert_eq!(task.assignee, Some(VolunteerId::new("vol_driver")));
    }

    let assignments = simulation.broker().journal_on(&Topic::Assignment).unwrap();
    assert_eq!(assignments.len(), 1);
}

#[test]
fn completed_task_frees_volunteer_within_the_same_publish() {
    let config = SimulationConfig::default();
    let simulation = declared(&config);
    simulation
        .register_volunteer(VolunteerId::new("solo"), skills(&[Skill::Logistics]))
        .unwrap();

    let surveys = vec![
        AreaSurvey {
            area_name: "first".to_owned(),
            needs: Some(BTreeMap::from([(Resource::Water, 100)])),
            urgency: Some(Urgency::new(9).unwrap()),
        },
        AreaSurvey {
            area_name: "second".to_owned(),
            needs: Some(BTreeMap::from([(Resource::Water, 100)])),
            urgency: Some(Urgency::new(4).unwrap()),
        },
    ];
    simulation.request_assessment(surveys).unwrap();

    let (first, pending) = {
        let volunteers = simulation.volunteers().unwrap();
        let first = volunteers
            .tasks()
            .iter()
            .find(|t| t.status == TaskStatus::Assigned)
            .unwrap()
            .clone();
        (first, volunteers.pending_count())
    };
    assert_eq!(first.area_name, "first");
    assert_eq!(pending, 1);

    simulation.complete_task(first.id).unwrap();
    let volunteers = simulation.volunteers().unwrap();
    assert_eq!(volunteers.pending_count(), 0);
    let second = volunteers
        .tasks()
        .iter()
        .find(|t| t.area_name == "second")
        .unwrap();
    assert_eq!(second.assignee, Some(VolunteerId::new("solo")));
}

#[test]
fn alert_reaches_each_listener_exactly_once() {
    let simulation = declared(&SimulationConfig::default());
    let staying = Arc::new(Mutex::new(Listener::new("dashboard")));
    let leaving = Arc::new(Mutex::new(Listener::new("pager")));
    simulation.broker().subscribe(Topic::Alerts, staying.clone()).unwrap();
    simulation.broker().subscribe(Topic::Alerts, leaving.clone()).unwrap();
    simulation
        .broker()
        .unsubscribe(&Topic::Alerts, &AgentId::new("pager"))
        .unwrap();

    let report = simulation
        .report_environment(EnvironmentalReading {
            weather: None,
            seismic: Some(SeismicReading {
                magnitude_tenths: 81,
            }),
        })
        .unwrap();
    assert!(report.failures.is_empty());

    let seen = staying.lock().unwrap().seen.clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].sender(), &AgentId::communication());
    let Payload::Alert(alert) = seen[0].payload() else {
        panic!("expected an alert payload");
    };
    assert_eq!(alert.kind, "seismic_risk");
    assert_eq!(alert.severity.value(), 8);
    assert!(leaving.lock().unwrap().seen.is_empty());
}

#[test]
fn failing_listener_does_not_block_others() {
    /// Always fails.
    struct Broken(AgentId);

    impl Subscriber for Broken {
        fn id(&self) -> &AgentId {
            &self.0
        }

        fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
            Err(DeliveryError::rejected(&self.0, message.topic(), "offline"))
        }
    }

    let simulation = declared(&SimulationConfig::default());
    simulation
        .broker()
        .subscribe(Topic::AssessmentReady, shared(Broken(AgentId::new("broken"))))
        .unwrap();

    let report = simulation.request_assessment(Vec::new()).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(!simulation.relief().unwrap().plans().is_empty());
}

#[test]
fn undeclared_disaster_produces_no_plans() {
    let simulation = Simulation::new(&SimulationConfig::default()).unwrap();
    let report = simulation.request_assessment(Vec::new()).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(simulation.relief().unwrap().plans().is_empty());
}

#[test]
fn demo_scenario_is_deterministic() {
    let config = SimulationConfig::default();
    let first = declared(&config);
    let second = declared(&config);

    let one = scenario::run(&first, &config.scenario).unwrap();
    let two = scenario::run(&second, &config.scenario).unwrap();
    assert_eq!(one, two);
    assert_eq!(
        first.relief().unwrap().plans(),
        second.relief().unwrap().plans()
    );

    assert!(one.plans > 0);
    assert!(one.pool_balanced);
    assert_eq!(one.areas_assessed, 3);
    assert_eq!(one.volunteers, 20);
    assert_eq!(one.teams, 5);
    assert_eq!(one.victims, 1);
    assert_eq!(one.victims_dispatched, 1);
    assert_eq!(one.alerts, 1);
    assert!(one.tasks_completed <= 1);
}

#[test]
fn same_input_same_plan_sequence() {
    let config = SimulationConfig::default();
    let surveys = || {
        ["b", "a", "c"]
            .iter()
            .map(|name| AreaSurvey {
                area_name: (*name).to_owned(),
                needs: Some(BTreeMap::from([(Resource::Food, 400), (Resource::Blankets, 50)])),
                urgency: Some(Urgency::new(5).unwrap()),
            })
            .collect::<Vec<_>>()
    };

    let first = declared(&config);
    let second = declared(&config);
    first.request_assessment(surveys()).unwrap();
    second.request_assessment(surveys()).unwrap();

    let plans = first.relief().unwrap().plans().to_vec();
    assert_eq!(plans, second.relief().unwrap().plans());
    let areas: Vec<&str> = plans.iter().map(|p| p.area_name.as_str()).collect();
    assert_eq!(areas, vec!["a", "a", "b", "b", "c", "c"]);
}

#[test]
fn repeated_area_is_allocated_once_against_its_recorded_need() {
    let simulation = declared(&SimulationConfig::default());
    let survey = |food: u32| AreaSurvey {
        area_name: "LA_Area_1".to_owned(),
        needs: Some(BTreeMap::from([(Resource::Food, food)])),
        urgency: Some(Urgency::new(9).unwrap()),
    };
    simulation
        .request_assessment(vec![survey(300), survey(400)])
        .unwrap();

    let snapshot = simulation.context().snapshot().unwrap();
    assert_eq!(snapshot.affected_areas.len(), 1);
    assert_eq!(
        snapshot.affected_areas[0].needs.get(&Resource::Food),
        Some(&400)
    );

    let relief = simulation.relief().unwrap();
    let plans: Vec<(String, u32)> = relief
        .plans()
        .iter()
        .map(|p| (p.area_name.clone(), p.quantity))
        .collect();
    assert_eq!(plans, vec![("LA_Area_1".to_owned(), 400)]);
    assert_eq!(relief.pool().allocated(Resource::Food), 400);
}
