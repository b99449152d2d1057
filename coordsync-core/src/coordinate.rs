/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rounds both axes to the given number of decimal places
    pub fn rounded(&self, places: i32) -> Self {
        Self {
            latitude: round_to(self.latitude, places),
            longitude: round_to(self.longitude, places),
        }
    }

    /// Absolute per-axis difference: (latitude delta, longitude delta)
    pub fn deltas(&self, other: &Coordinate) -> (f64, f64) {
        (
            (self.latitude - other.latitude).abs(),
            (self.longitude - other.longitude).abs(),
        )
    }
}

/// Formats an optional coordinate for progress output
/// Example: "12.9716, 77.5946" or "none"
pub fn format_pair(coordinate: Option<Coordinate>) -> String {
    match coordinate {
        Some(c) => format!("{}, {}", c.latitude, c.longitude),
        None => "none".to_string(),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
