use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::coordinate::Coordinate;

/// Default Google Maps Geocoding endpoint
pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Which query variant produced a hit, most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryVariant {
    /// "name, location, state, country"
    Full,
    /// "name, state, country"
    NameStateCountry,
    /// "name, location"
    NameLocation,
    /// "name"
    NameOnly,
    /// "location, state, country" without the name
    LocationOnly,
}

/// A single query string to submit, tagged with its variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeQuery {
    pub variant: QueryVariant,
    pub text: String,
}

/// Outcome of one lookup call as reported by the geocoding service
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found {
        coordinate: Coordinate,
        formatted_address: String,
    },
    ZeroResults,
    RateLimited,
    /// Any other service status (REQUEST_DENIED, INVALID_REQUEST, ...)
    Status(String),
}

/// The accepted result for a record
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub coordinate: Coordinate,
    pub formatted_address: String,
    pub variant: QueryVariant,
}

/// A forward-geocoding backend: one free-text query in, one outcome out.
///
/// `Err` is reserved for transport-level failures (connection, timeout,
/// undecodable body); service-reported statuses come back as `Ok`.
pub trait GeocodeLookup {
    fn lookup(&self, query: &str) -> Result<LookupOutcome>;

    /// False when the backend is missing credentials and every call would fail
    fn is_configured(&self) -> bool {
        true
    }
}

/// Build the ordered list of query strings for a record, most specific first
pub fn build_queries(name: &str, location: &str, state: &str, country: &str) -> Vec<GeocodeQuery> {
    vec![
        GeocodeQuery {
            variant: QueryVariant::Full,
            text: format!("{}, {}, {}, {}", name, location, state, country),
        },
        GeocodeQuery {
            variant: QueryVariant::NameStateCountry,
            text: format!("{}, {}, {}", name, state, country),
        },
        GeocodeQuery {
            variant: QueryVariant::NameLocation,
            text: format!("{}, {}", name, location),
        },
        GeocodeQuery {
            variant: QueryVariant::NameOnly,
            text: name.to_string(),
        },
        GeocodeQuery {
            variant: QueryVariant::LocationOnly,
            text: format!("{}, {}, {}", location, state, country),
        },
    ]
}

/// Settings for the query fallback procedure
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Pause after a rate-limit response before moving to the next query
    pub rate_limit_pause: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            rate_limit_pause: Duration::from_secs(2),
        }
    }
}

/// Runs the query fallback procedure against a lookup backend
pub struct Geocoder<L> {
    lookup: L,
    config: GeocoderConfig,
}

impl<L: GeocodeLookup> Geocoder<L> {
    pub fn new(lookup: L, config: GeocoderConfig) -> Self {
        Self { lookup, config }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Try each query variant in order and return the first usable result.
    /// Later variants are never consulted once one succeeds.
    pub fn resolve(
        &self,
        name: &str,
        location: &str,
        state: &str,
        country: &str,
    ) -> Option<GeocodeHit> {
        if !self.lookup.is_configured() {
            log::warn!("    Geocoding API key not set, skipping lookup");
            return None;
        }

        for query in build_queries(name, location, state, country) {
            log::info!("    Trying: {}...", truncate(&query.text, 70));

            match self.lookup.lookup(&query.text) {
                Ok(LookupOutcome::Found {
                    coordinate,
                    formatted_address,
                }) => {
                    if query.variant == QueryVariant::LocationOnly {
                        log::info!(
                            "    Found (location only): {}...",
                            truncate(&formatted_address, 80)
                        );
                    } else {
                        log::info!("    Found: {}...", truncate(&formatted_address, 80));
                    }
                    return Some(GeocodeHit {
                        coordinate,
                        formatted_address,
                        variant: query.variant,
                    });
                }
                Ok(LookupOutcome::ZeroResults) => {
                    log::debug!("    No results for {:?}", query.variant);
                }
                Ok(LookupOutcome::RateLimited) => {
                    log::warn!(
                        "    API quota exceeded. Waiting {:?}...",
                        self.config.rate_limit_pause
                    );
                    std::thread::sleep(self.config.rate_limit_pause);
                }
                Ok(LookupOutcome::Status(status)) => {
                    log::warn!("    API status: {}", status);
                }
                Err(e) => {
                    log::warn!("    Request error: {:#}", e);
                }
            }
        }

        None
    }
}

/// Truncate to at most `max` characters (not bytes) for log output
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Google Geocoding API response structure
#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    geometry: Geometry,
    #[serde(default)]
    formatted_address: String,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Settings for the Google Maps backend
#[derive(Debug, Clone)]
pub struct GoogleGeocoderConfig {
    /// API key; `None` leaves the backend unconfigured
    pub api_key: Option<String>,
    pub endpoint: String,
    /// Region bias (ccTLD code)
    pub region: String,
    pub timeout: Duration,
}

impl Default for GoogleGeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: GOOGLE_GEOCODE_URL.to_string(),
            region: "in".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Forward geocoding through the Google Maps Geocoding API
pub struct GoogleGeocoder {
    client: reqwest::blocking::Client,
    config: GoogleGeocoderConfig,
}

impl GoogleGeocoder {
    pub fn new(config: GoogleGeocoderConfig) -> Result<Self> {
        let user_agent = format!("coordsync/{}", env!("CARGO_PKG_VERSION"));

        // Use blocking reqwest since the whole run is sequential
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }
}

impl GeocodeLookup for GoogleGeocoder {
    fn lookup(&self, query: &str) -> Result<LookupOutcome> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .context("Geocoding API key not set")?;

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("address", query),
                ("key", api_key),
                ("region", self.config.region.as_str()),
            ])
            .send()
            .context("Failed to send geocoding request")?;

        if !response.status().is_success() {
            anyhow::bail!("Geocoding API returned status: {}", response.status());
        }

        let data: GoogleResponse = response
            .json()
            .context("Failed to parse geocoding response")?;

        Ok(outcome_from_response(data))
    }

    fn is_configured(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }
}

fn outcome_from_response(data: GoogleResponse) -> LookupOutcome {
    match data.status.as_str() {
        "OK" => match data.results.into_iter().next() {
            Some(first) => LookupOutcome::Found {
                coordinate: Coordinate::new(first.geometry.location.lat, first.geometry.location.lng),
                formatted_address: first.formatted_address,
            },
            None => LookupOutcome::ZeroResults,
        },
        "ZERO_RESULTS" => LookupOutcome::ZeroResults,
        "OVER_QUERY_LIMIT" => LookupOutcome::RateLimited,
        _ => match data.error_message {
            Some(message) => LookupOutcome::Status(format!("{} ({})", data.status, message)),
            None => LookupOutcome::Status(data.status),
        },
    }
}
