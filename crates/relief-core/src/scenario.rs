//! The demo scenario run by the engine binary.
//!
//! 1. Request an assessment of the configured areas (plans and tasks follow).
//! 2. Register volunteers with one to three seeded random skills each.
//! 3. Report a victim before any rescue team is known.
//! 4. Place rescue teams around the base; the first report dispatches the
//!    open victim request.
//! 5. Feed a weather reading and a seismic reading to analytics.
//! 6. Complete the first assigned task, freeing its volunteer.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use relief_types::{
    EnvironmentalReading, GeoPoint, SeismicReading, Skill, TaskStatus, TeamId, Urgency,
    VolunteerId, WeatherReading,
};
use tracing::info;

use crate::config::ScenarioConfig;
use crate::error::SimulationError;
use crate::simulation::{Simulation, SimulationSummary};

/// Most skills a generated volunteer can have.
const MAX_SKILLS_PER_VOLUNTEER: usize = 3;

/// Urgency the scenario victim reports.
const VICTIM_URGENCY: u8 = 6;

/// Run the demo scenario against a declared simulation.
pub fn run(
    simulation: &Simulation,
    scenario: &ScenarioConfig,
) -> Result<SimulationSummary, SimulationError> {
    let mut rng = StdRng::seed_from_u64(scenario.seed);
    let base = GeoPoint::new(scenario.base_lat, scenario.base_lon);

    let report = simulation.request_assessment(Vec::new())?;
    info!(cascaded = report.cascaded, "Assessment round finished");

    for i in 1..=scenario.volunteers {
        let skills = random_skills(&mut rng);
        simulation.register_volunteer(VolunteerId::new(format!("vol_{i}")), skills)?;
    }
    info!(volunteers = scenario.volunteers, "Volunteers registered");

    let victim = GeoPoint::new(base.lat + 0.01, base.lon - 0.01);
    simulation.report_victim(
        victim,
        "Family trapped in collapsed building",
        Urgency::new(VICTIM_URGENCY)?,
    )?;

    for i in 1..=scenario.teams {
        let location = GeoPoint::new(
            base.lat + offset(&mut rng, scenario.team_spread_deg),
            base.lon + offset(&mut rng, scenario.team_spread_deg),
        );
        simulation.update_team_location(TeamId::new(format!("team_{i}")), location)?;
    }
    info!(teams = scenario.teams, "Rescue teams placed");

    simulation.report_environment(EnvironmentalReading {
        weather: Some(WeatherReading {
            wind_speed_kmh: scenario.wind_speed_kmh,
            rainfall_mm: scenario.rainfall_mm,
        }),
        seismic: None,
    })?;
    simulation.report_environment(EnvironmentalReading {
        weather: None,
        seismic: Some(SeismicReading {
            magnitude_tenths: scenario.magnitude_tenths,
        }),
    })?;

    let first_assigned = simulation
        .volunteers()?
        .tasks()
        .iter()
        .find(|t| t.status == TaskStatus::Assigned)
        .map(|t| t.id);
    if let Some(task_id) = first_assigned {
        simulation.complete_task(task_id)?;
    }

    simulation.summary()
}

fn random_skills(rng: &mut StdRng) -> BTreeSet<Skill> {
    let mut skills = Skill::ALL;
    skills.shuffle(rng);
    let count = rng.random_range(1..=MAX_SKILLS_PER_VOLUNTEER);
    skills.iter().take(count).copied().collect()
}

/// Uniform offset in `[-spread, spread]`, or zero for an unusable spread.
fn offset(rng: &mut StdRng, spread: f64) -> f64 {
    if spread.is_finite() && spread > 0.0 {
        rng.random_range(-spread..=spread)
    } else {
        0.0
    }
}
