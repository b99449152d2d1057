use clap::Parser;
use std::path::PathBuf;

/// Re-geocode stored place coordinates and fix the ones that drifted
#[derive(Parser, Debug)]
#[command(name = "coordsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Updates record coordinates using the Google Maps Geocoding API", long_about = None)]
pub struct Args {
    /// JSON file holding the record list (read, and rewritten when anything changes)
    #[arg(value_name = "FILE", default_value = "src/data/locations.json")]
    pub file: PathBuf,

    /// Google Maps Geocoding API key
    #[arg(long = "api-key", env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Run in dry-run mode (report changes without rewriting the file)
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Country appended to queries for records without one
    #[arg(long = "country", default_value = "India")]
    pub country: String,

    /// Region bias passed to the geocoding API (ccTLD code)
    #[arg(long = "region", default_value = "in")]
    pub region: String,

    /// Per-axis tolerance in degrees before a coordinate is replaced
    #[arg(long = "threshold", default_value_t = 0.01)]
    pub threshold: f64,

    /// Delay between records in milliseconds
    #[arg(long = "delay-ms", default_value_t = 100)]
    pub delay_ms: u64,

    /// Pause after a rate-limit response in milliseconds
    #[arg(long = "rate-limit-pause-ms", default_value_t = 2000)]
    pub rate_limit_pause_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long = "timeout-secs", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Geocoding endpoint URL
    #[arg(long = "endpoint", default_value = coordsync_core::GOOGLE_GEOCODE_URL)]
    pub endpoint: String,
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
