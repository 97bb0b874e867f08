//! Latest environmental conditions as seen by the whole response.
//!
//! Analytics keeps the full reading history it needs for prediction; the
//! context only holds the most recent weather and seismic values so every
//! agent can read current conditions from a snapshot.

use relief_types::{EnvironmentalReading, SeismicReading, WeatherReading};
use serde::Serialize;

/// Most recent weather and seismic readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentSnapshot {
    /// Latest weather reading, if any arrived.
    pub weather: Option<WeatherReading>,
    /// Latest seismic reading, if any arrived.
    pub seismic: Option<SeismicReading>,
    /// Number of reading batches folded into the snapshot.
    pub batches_seen: u64,
}

impl EnvironmentSnapshot {
    /// Fold a reading batch into the snapshot.
    ///
    /// Signals absent from the batch keep their previous value.
    pub fn apply(&mut self, reading: &EnvironmentalReading) {
        if let Some(weather) = reading.weather {
            self.weather = Some(weather);
        }
        if let Some(seismic) = reading.seismic {
            self.seismic = Some(seismic);
        }
        self.batches_seen = self.batches_seen.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_keeps_signals_missing_from_batch() {
        let mut snapshot = EnvironmentSnapshot::default();
        snapshot.apply(&EnvironmentalReading {
            weather: Some(WeatherReading {
                wind_speed_kmh: 60,
                rainfall_mm: 5,
            }),
            seismic: None,
        });
        snapshot.apply(&EnvironmentalReading {
            weather: None,
            seismic: Some(SeismicReading {
                magnitude_tenths: 52,
            }),
        });

        assert_eq!(snapshot.weather.map(|w| w.wind_speed_kmh), Some(60));
        assert_eq!(snapshot.seismic.map(|s| s.magnitude_tenths), Some(52));
        assert_eq!(snapshot.batches_seen, 2);
    }
}
