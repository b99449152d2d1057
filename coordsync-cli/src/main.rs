use anyhow::Result;
use coordsync_core::{
    sync_file, Geocoder, GeocoderConfig, GoogleGeocoder, GoogleGeocoderConfig, ReconcileConfig,
    ReconcileReport, SyncConfig,
};
use std::time::Duration;

mod cli;

/// Failures listed individually in the final summary
const FAILURE_DISPLAY_LIMIT: usize = 10;

fn main() -> Result<()> {
    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let api_key = args.api_key.filter(|key| !key.trim().is_empty());
    if api_key.is_none() {
        eprintln!("⚠️  WARNING: GOOGLE_MAPS_API_KEY environment variable not set!");
        eprintln!("   Set it with: export GOOGLE_MAPS_API_KEY='your-api-key'");
        eprintln!("   Or pass it with: --api-key your-api-key");
        eprintln!("\n   Get your API key from: https://console.cloud.google.com/google/maps-apis");
        eprintln!("\n   Continuing anyway, but geocoding will fail...\n");
    }

    if args.dry_run {
        log::info!("Running in DRY-RUN mode - the file will not be rewritten");
    }

    let google = GoogleGeocoder::new(GoogleGeocoderConfig {
        api_key,
        endpoint: args.endpoint,
        region: args.region,
        timeout: Duration::from_secs(args.timeout_secs),
    })?;
    let geocoder = Geocoder::new(
        google,
        GeocoderConfig {
            rate_limit_pause: Duration::from_millis(args.rate_limit_pause_ms),
        },
    );

    let config = SyncConfig {
        reconcile: ReconcileConfig {
            threshold: args.threshold,
            default_country: args.country,
            record_delay: Duration::from_millis(args.delay_ms),
        },
        dry_run: args.dry_run,
    };

    log::info!("Starting coordinate update using Google Maps Geocoding API...");
    let outcome = sync_file(&args.file, &config, &geocoder)?;

    print_summary(&outcome.report, outcome.written, args.dry_run);

    Ok(())
}

fn print_summary(report: &ReconcileReport, written: bool, dry_run: bool) {
    if report.updated > 0 {
        if written {
            println!("\n✅ Updated {} location(s) with accurate coordinates.", report.updated);
        } else if dry_run {
            println!("\n[DRY RUN] Would update {} location(s).", report.updated);
        }
    } else {
        println!("\n✓ All coordinates appear accurate. No updates needed.");
    }

    if !report.failures.is_empty() {
        println!("\n⚠️  Failed to geocode {} location(s):", report.failures.len());
        let (shown, more) = report.failure_listing(FAILURE_DISPLAY_LIMIT);
        for failed in shown {
            println!("  - {}: {}", failed.name, failed.location);
        }
        if more > 0 {
            println!("  ... and {} more", more);
        }
    }

    println!(
        "\nProcess completed. {} of {} location(s) updated.",
        report.updated, report.total
    );
}
