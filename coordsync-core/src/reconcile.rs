use std::time::Duration;

use crate::coordinate::{format_pair, Coordinate};
use crate::geocoding::{GeocodeLookup, Geocoder};
use crate::record::LocationRecord;

/// Decimal places kept when a coordinate is overwritten
pub const COORDINATE_PRECISION: i32 = 6;

/// Result of comparing a stored coordinate against a geocoded candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateCheck {
    /// Both axes within the threshold
    Accurate { lat_diff: f64, lng_diff: f64 },
    /// At least one axis beyond the threshold, or nothing stored
    Moved { lat_diff: f64, lng_diff: f64 },
}

/// Compare stored vs candidate; a missing stored coordinate always counts as moved
pub fn check_coordinate(
    stored: Option<Coordinate>,
    candidate: Coordinate,
    threshold: f64,
) -> CoordinateCheck {
    let (lat_diff, lng_diff) = match stored {
        Some(stored) => stored.deltas(&candidate),
        None => (f64::INFINITY, f64::INFINITY),
    };

    if lat_diff > threshold || lng_diff > threshold {
        CoordinateCheck::Moved { lat_diff, lng_diff }
    } else {
        CoordinateCheck::Accurate { lat_diff, lng_diff }
    }
}

/// A record that could not be geocoded with any query variant
#[derive(Debug, Clone, PartialEq)]
pub struct FailedRecord {
    pub name: String,
    pub location: String,
}

/// Counts and failures from one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub total: usize,
    pub updated: usize,
    pub accurate: usize,
    pub failures: Vec<FailedRecord>,
}

impl ReconcileReport {
    /// First `cap` failures plus the number left out
    pub fn failure_listing(&self, cap: usize) -> (&[FailedRecord], usize) {
        let shown = self.failures.len().min(cap);
        (&self.failures[..shown], self.failures.len() - shown)
    }
}

/// Settings for the reconciliation loop
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Per-axis tolerance in degrees (0.01 is roughly 1 km)
    pub threshold: f64,
    /// Country used when a record carries none
    pub default_country: String,
    /// Pause after each record to stay under the API request rate
    pub record_delay: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            threshold: 0.01,
            default_country: "India".to_string(),
            record_delay: Duration::from_millis(100),
        }
    }
}

pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Walk every record in order, overwriting coordinates that moved
    pub fn run<L: GeocodeLookup>(
        &self,
        records: &mut [LocationRecord],
        geocoder: &Geocoder<L>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport {
            total: records.len(),
            ..Default::default()
        };

        for record in records.iter_mut() {
            log::info!("");
            log::info!("[{}/{}] {}", record.id(), report.total, record.name());
            log::info!("  Location: {}", record.location());
            log::info!("  Current: {}", format_pair(record.coordinate()));

            let country = record.country_or(&self.config.default_country).to_string();
            let hit = geocoder.resolve(record.name(), record.location(), record.state(), &country);

            match hit {
                Some(hit) => match check_coordinate(record.coordinate(), hit.coordinate, self.config.threshold) {
                    CoordinateCheck::Moved { lat_diff, lng_diff } => {
                        let new_coordinate = hit.coordinate.rounded(COORDINATE_PRECISION);
                        record.set_coordinate(new_coordinate);
                        report.updated += 1;
                        log::info!(
                            "  Updated: {} (diff: {:.4}, {:.4})",
                            format_pair(Some(new_coordinate)),
                            lat_diff,
                            lng_diff
                        );
                    }
                    CoordinateCheck::Accurate { lat_diff, lng_diff } => {
                        report.accurate += 1;
                        log::info!("  Accurate (diff: {:.4}, {:.4})", lat_diff, lng_diff);
                    }
                },
                None => {
                    log::warn!("  Could not geocode. Keeping original.");
                    report.failures.push(FailedRecord {
                        name: record.name().to_string(),
                        location: record.location().to_string(),
                    });
                }
            }

            if !self.config.record_delay.is_zero() {
                std::thread::sleep(self.config.record_delay);
            }
        }

        report
    }
}
