use anyhow::Result;
use std::path::Path;

mod coordinate;
mod geocoding;
mod reconcile;
mod record;

// Re-export public types
pub use coordinate::{format_pair, Coordinate};
pub use geocoding::{
    build_queries, GeocodeHit, GeocodeLookup, GeocodeQuery, Geocoder, GeocoderConfig,
    GoogleGeocoder, GoogleGeocoderConfig, LookupOutcome, QueryVariant, GOOGLE_GEOCODE_URL,
};
pub use reconcile::{
    check_coordinate, CoordinateCheck, FailedRecord, ReconcileConfig, ReconcileReport, Reconciler,
    COORDINATE_PRECISION,
};
pub use record::{load_records, save_records, LocationRecord, RecordId};

/// Configuration options for a sync run over one file
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    pub reconcile: ReconcileConfig,
    /// Report what would change without rewriting the file
    pub dry_run: bool,
}

/// Result of a sync run
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub report: ReconcileReport,
    /// Whether the file was rewritten
    pub written: bool,
}

/// Load the records file, reconcile every record, and rewrite the file
/// if and only if at least one coordinate changed (and not in dry-run mode)
pub fn sync_file<L: GeocodeLookup>(
    path: &Path,
    config: &SyncConfig,
    geocoder: &Geocoder<L>,
) -> Result<SyncOutcome> {
    let mut records = load_records(path)?;
    log::info!("Loaded {} records from {}", records.len(), path.display());

    let reconciler = Reconciler::new(config.reconcile.clone());
    let report = reconciler.run(&mut records, geocoder);

    let written = if report.updated == 0 {
        false
    } else if config.dry_run {
        log::info!(
            "[DRY RUN] Would write {} updated record(s) to {}",
            report.updated,
            path.display()
        );
        false
    } else {
        save_records(path, &records)?;
        log::info!("Wrote {} records to {}", records.len(), path.display());
        true
    };

    Ok(SyncOutcome { report, written })
}
