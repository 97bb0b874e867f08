//! Configuration loading and typed config structures for the relief
//! simulation.
//!
//! The canonical configuration lives in `relief-config.yaml` at the project
//! root; the `RELIEF_CONFIG` environment variable points at another file.
//! Every section and field has a default, so a partial file only overrides
//! what it names.

use std::path::{Path, PathBuf};

use relief_agents::{AnalyticsConfig, CommunicationConfig, ReliefConfig};
use relief_broker::{BrokerConfig, DEFAULT_JOURNAL_CAPACITY, DEFAULT_MAX_CASCADE_DEPTH};
use serde::Deserialize;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "relief-config.yaml";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "RELIEF_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `relief-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// The disaster to declare.
    #[serde(default)]
    pub disaster: DisasterConfig,

    /// Broker limits.
    #[serde(default)]
    pub broker: BrokerSection,

    /// Topic routing extras.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Relief coordinator stock.
    #[serde(default)]
    pub resources: ReliefConfig,

    /// Analytics tunables.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Communication tunables.
    #[serde(default)]
    pub communication: CommunicationConfig,

    /// Demo scenario driven by the engine binary.
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Path of the config file: `RELIEF_CONFIG` if set, else
    /// [`DEFAULT_CONFIG_PATH`].
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// The disaster declared at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisasterConfig {
    /// Kind of disaster (default: "earthquake").
    #[serde(default = "default_disaster_type")]
    pub disaster_type: String,

    /// Where it struck (default: "LA").
    #[serde(default = "default_location")]
    pub location: String,

    /// Severity on the 1-10 declaration scale (default: 8).
    #[serde(default = "default_severity")]
    pub severity: u8,
}

impl Default for DisasterConfig {
    fn default() -> Self {
        Self {
            disaster_type: default_disaster_type(),
            location: default_location(),
            severity: default_severity(),
        }
    }
}

/// Broker limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BrokerSection {
    /// Longest reaction chain below a top-level publish (default: 32).
    #[serde(default = "default_max_cascade_depth")]
    pub max_cascade_depth: usize,

    /// Messages retained in the journal (default: 1024).
    #[serde(default = "default_journal_capacity")]
    pub journal_capacity: usize,
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            max_cascade_depth: default_max_cascade_depth(),
            journal_capacity: default_journal_capacity(),
        }
    }
}

impl From<BrokerSection> for BrokerConfig {
    fn from(section: BrokerSection) -> Self {
        Self {
            max_cascade_depth: section.max_cascade_depth,
            journal_capacity: section.journal_capacity,
        }
    }
}

/// Topic routing extras.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoutingConfig {
    /// Extra `*_alert` topics the communication agent relays (default: none).
    #[serde(default)]
    pub custom_alert_topics: Vec<String>,
}

/// The demo scenario: volunteers, rescue teams, a victim and sensor data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    /// Seed for volunteer skills and team placement (default: 7).
    #[serde(default = "default_scenario_seed")]
    pub seed: u64,

    /// Volunteers to register (default: 20).
    #[serde(default = "default_volunteers")]
    pub volunteers: u32,

    /// Rescue teams to place (default: 5).
    #[serde(default = "default_teams")]
    pub teams: u32,

    /// Latitude teams are scattered around (default: 34.0522).
    #[serde(default = "default_base_lat")]
    pub base_lat: f64,

    /// Longitude teams are scattered around (default: -118.2437).
    #[serde(default = "default_base_lon")]
    pub base_lon: f64,

    /// Maximum team offset from the base, in degrees (default: 0.05).
    #[serde(default = "default_team_spread_deg")]
    pub team_spread_deg: f64,

    /// Wind speed of the weather reading (default: 60 km/h).
    #[serde(default = "default_wind_speed_kmh")]
    pub wind_speed_kmh: u32,

    /// Rainfall of the weather reading (default: 5 mm).
    #[serde(default = "default_rainfall_mm")]
    pub rainfall_mm: u32,

    /// Magnitude of the seismic reading in tenths (default: 72, i.e. 7.2).
    #[serde(default = "default_magnitude_tenths")]
    pub magnitude_tenths: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: default_scenario_seed(),
            volunteers: default_volunteers(),
            teams: default_teams(),
            base_lat: default_base_lat(),
            base_lon: default_base_lon(),
            team_spread_deg: default_team_spread_deg(),
            wind_speed_kmh: default_wind_speed_kmh(),
            rainfall_mm: default_rainfall_mm(),
            magnitude_tenths: default_magnitude_tenths(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output (default: false).
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_disaster_type() -> String {
    "earthquake".to_owned()
}

fn default_location() -> String {
    "LA".to_owned()
}

const fn default_severity() -> u8 {
    8
}

const fn default_max_cascade_depth() -> usize {
    DEFAULT_MAX_CASCADE_DEPTH
}

const fn default_journal_capacity() -> usize {
    DEFAULT_JOURNAL_CAPACITY
}

const fn default_scenario_seed() -> u64 {
    7
}

const fn default_volunteers() -> u32 {
    20
}

const fn default_teams() -> u32 {
    5
}

const fn default_base_lat() -> f64 {
    34.0522
}

const fn default_base_lon() -> f64 {
    -118.2437
}

const fn default_team_spread_deg() -> f64 {
    0.05
}

const fn default_wind_speed_kmh() -> u32 {
    60
}

const fn default_rainfall_mm() -> u32 {
    5
}

const fn default_magnitude_tenths() -> u32 {
    72
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use relief_types::Resource;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.disaster.severity, 8);
        assert_eq!(config.broker.max_cascade_depth, 32);
        assert_eq!(config.analytics.window, 5);
        assert_eq!(config.scenario.volunteers, 20);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
disaster:
  disaster_type: "flood"
  location: "Houston"
  severity: 6

broker:
  max_cascade_depth: 8
  journal_capacity: 64

routing:
  custom_alert_topics:
    - flood_alert

resources:
  initial_pool:
    food: 10
    water: 20

analytics:
  seed: 99
  areas:
    - Downtown
    - Harbor
  alert_threshold: 5

communication:
  boost_step_km: 2

scenario:
  volunteers: 4
  teams: 2

logging:
  level: "debug"
  json: true
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.disaster.location, "Houston");
        assert_eq!(config.broker.journal_capacity, 64);
        assert_eq!(config.routing.custom_alert_topics, vec!["flood_alert"]);
        assert_eq!(config.resources.initial_pool.get(&Resource::Water), Some(&20));
        assert_eq!(config.resources.initial_pool.get(&Resource::Blankets), None);
        assert_eq!(config.analytics.seed, 99);
        assert_eq!(config.analytics.window, 5);
        assert_eq!(config.analytics.areas.len(), 2);
        assert_eq!(config.communication.boost_step_km, 2);
        assert_eq!(config.scenario.teams, 2);
        assert_eq!(config.scenario.magnitude_tenths, 72);
        assert!(config.logging.json);
    }

    #[test]
    fn partial_yaml_keeps_other_sections() {
        let yaml = "disaster:\n  severity: 3\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.disaster.severity, 3);
        assert_eq!(config.disaster.disaster_type, "earthquake");
        assert_eq!(config.resources, ReliefConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = SimulationConfig::parse("disaster: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn broker_section_converts() {
        let section = BrokerSection {
            max_cascade_depth: 4,
            journal_capacity: 0,
        };
        let config = BrokerConfig::from(section);
        assert_eq!(config.max_cascade_depth, 4);
        assert_eq!(config.journal_capacity, 0);
    }
}
