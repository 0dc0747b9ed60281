//! Geocode Reconciler - fills missing address fields from coordinates
//!
//! One sequential pass over the candidate records: reverse geocode, merge,
//! persist, with fixed pacing between provider calls.

use clap::Parser;
use geocode_reconciler::{
    select_candidates, Args, ConsoleReporter, Database, LogReporter, ReconcilerConfig,
    ReconciliationPipeline, Reporter, ReporterKind, Result,
};
use reverse_geocoding::ReverseGeocodeClient;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("geocode_reconciler=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let args = Args::parse();
    let config = ReconcilerConfig::from_args(args, |key| std::env::var(key).ok())?;

    info!("Starting geocode reconciler...");
    info!(
        batch_size = config.pipeline.batch_size,
        delay_ms = config.pipeline.request_delay.as_millis() as u64,
        batch_pause_ms = config.pipeline.batch_pause.as_millis() as u64,
        limit = config.filter.limit,
        sectors = ?config.filter.sectors,
        "Configuration loaded"
    );

    let geocoder = ReverseGeocodeClient::from_settings(&config.client)?;

    // The only fatal runtime failure: no store, no run
    let db = Database::connect(&config.database_url).await.map_err(|e| {
        error!("Error connecting to database: {}", e);
        e
    })?;

    if config.migrate {
        db.migrate().await?;
    }

    let records = select_candidates(&db, &config.filter).await?;

    let reporter: Box<dyn Reporter> = match config.reporter {
        ReporterKind::Log => Box::new(LogReporter),
        ReporterKind::Console => Box::new(ConsoleReporter::stdout()),
    };

    let pipeline =
        ReconciliationPipeline::new(&db, &geocoder, reporter.as_ref(), config.pipeline.clone());
    let summary = pipeline.run(&records).await;

    if config.json_summary {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize summary: {}", e),
        }
    }

    db.close().await;
    Ok(())
}
