//! Tunables for the four agents.
//!
//! Each struct deserializes from its section of `relief-config.yaml` with
//! per-field defaults, so a partial section only overrides what it names.
//! Tests construct them directly with struct update syntax.

use std::collections::BTreeMap;

use relief_types::Resource;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Relief coordinator
// ---------------------------------------------------------------------------

/// Relief coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReliefConfig {
    /// Starting stock of each resource.
    ///
    /// Resources missing from the map start at zero.
    #[serde(default = "default_initial_pool")]
    pub initial_pool: BTreeMap<Resource, u32>,
}

impl Default for ReliefConfig {
    fn default() -> Self {
        Self {
            initial_pool: default_initial_pool(),
        }
    }
}

fn default_initial_pool() -> BTreeMap<Resource, u32> {
    BTreeMap::from([
        (Resource::Food, 1000),
        (Resource::Water, 5000),
        (Resource::MedicalSupplies, 500),
        (Resource::ShelterKits, 200),
        (Resource::Blankets, 1000),
    ])
}

// ---------------------------------------------------------------------------
// Communication
// ---------------------------------------------------------------------------

/// Communication agent settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CommunicationConfig {
    /// Distance band, in kilometres, that costs one urgency point of the
    /// proximity boost (default: 1).
    #[serde(default = "default_boost_step_km")]
    pub boost_step_km: u32,
}

impl Default for CommunicationConfig {
    fn default() -> Self {
        Self {
            boost_step_km: default_boost_step_km(),
        }
    }
}

const fn default_boost_step_km() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Analytics agent settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalyticsConfig {
    /// Seed for need generation (default: 42).
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of generated areas when none are configured (default: 3).
    #[serde(default = "default_area_count")]
    pub area_count: u32,

    /// Explicit area names. Empty means `{location}_Area_{i}` for
    /// `i` in `1..=area_count`.
    #[serde(default)]
    pub areas: Vec<String>,

    /// Resources every generated assessment asks for.
    #[serde(default = "default_need_resources")]
    pub need_resources: Vec<Resource>,

    /// Lower bound of a generated need before the severity weight (default: 20).
    #[serde(default = "default_need_min")]
    pub need_min: u32,

    /// Upper bound of a generated need before the severity weight (default: 200).
    #[serde(default = "default_need_max")]
    pub need_max: u32,

    /// Risk level that must be exceeded to raise an alert (default: 6).
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: u8,

    /// Number of recent readings averaged per signal (default: 5).
    #[serde(default = "default_window")]
    pub window: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            area_count: default_area_count(),
            areas: Vec::new(),
            need_resources: default_need_resources(),
            need_min: default_need_min(),
            need_max: default_need_max(),
            alert_threshold: default_alert_threshold(),
            window: default_window(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_area_count() -> u32 {
    3
}

fn default_need_resources() -> Vec<Resource> {
    vec![Resource::Food, Resource::Water, Resource::MedicalSupplies]
}

const fn default_need_min() -> u32 {
    20
}

const fn default_need_max() -> u32 {
    200
}

const fn default_alert_threshold() -> u8 {
    6
}

const fn default_window() -> usize {
    5
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_covers_every_resource() {
        let config = ReliefConfig::default();
        for resource in Resource::ALL {
            assert!(config.initial_pool.get(&resource).is_some_and(|q| *q > 0));
        }
    }

    #[test]
    fn partial_analytics_section_keeps_defaults() {
        let parsed: Result<AnalyticsConfig, _> = serde_json::from_str(r#"{"seed": 7}"#);
        let config = parsed.unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.window, 5);
        assert_eq!(config.alert_threshold, 6);
    }
}
