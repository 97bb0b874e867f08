//! Engine binary for the disaster response simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `relief-config.yaml` (or `RELIEF_CONFIG`)
//! 2. Initialize structured logging (tracing), JSON when configured
//! 3. Build the broker, shared context and the four agents
//! 4. Declare the configured disaster
//! 5. Run the demo scenario
//! 6. Log the summary

mod error;

use anyhow::Context as _;
use relief_core::config::LoggingConfig;
use relief_core::{Simulation, SimulationConfig, scenario};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, setup or the scenario fails.
fn main() -> anyhow::Result<()> {
    let (config, loaded_from_file) = load_config().context("failed to load configuration")?;
    init_logging(&config.logging);

    info!(
        path = %SimulationConfig::path().display(),
        from_file = loaded_from_file,
        disaster_type = %config.disaster.disaster_type,
        location = %config.disaster.location,
        severity = config.disaster.severity,
        "Configuration loaded"
    );

    run(&config).context("relief simulation failed")?;
    Ok(())
}

fn run(config: &SimulationConfig) -> Result<(), EngineError> {
    let simulation = Simulation::new(config)?;
    simulation.declare(&config.disaster)?;
    info!("System initialized");

    let summary = scenario::run(&simulation, &config.scenario)?;
    info!(
        areas_assessed = summary.areas_assessed,
        plans = summary.plans,
        units_allocated = summary.units_allocated,
        pool_balanced = summary.pool_balanced,
        volunteers = summary.volunteers,
        tasks_pending = summary.tasks_pending,
        tasks_assigned = summary.tasks_assigned,
        tasks_completed = summary.tasks_completed,
        teams = summary.teams,
        victims = summary.victims,
        victims_dispatched = summary.victims_dispatched,
        alerts = summary.alerts,
        journal_entries = summary.journal_entries,
        "Simulation completed"
    );
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load configuration, falling back to defaults when no file exists.
///
/// Returns the config and whether it came from a file.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let path = SimulationConfig::path();
    if path.exists() {
        Ok((SimulationConfig::from_file(&path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}
