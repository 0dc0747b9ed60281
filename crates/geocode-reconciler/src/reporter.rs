//! Run progress reporting: structured logs or a console report

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use project_map_db::{AddressField, GeoRecord};
use tracing::{info, warn};

use crate::selector::count_by_sector;
use crate::types::{RecordOutcome, RunSummary};

/// Observer of a reconciliation run. Never influences processing.
pub trait Reporter: Send + Sync {
    fn run_started(&self, candidates: &[GeoRecord]);
    /// `position` is 1-based
    fn record_finished(
        &self,
        position: usize,
        total: usize,
        record: &GeoRecord,
        outcome: &RecordOutcome,
    );
    fn batch_paused(&self, calls: usize, pause: Duration);
    fn run_finished(&self, summary: &RunSummary);
}

/// Reports through `tracing` events
pub struct LogReporter;

impl Reporter for LogReporter {
    fn run_started(&self, candidates: &[GeoRecord]) {
        info!(candidates = candidates.len(), "Starting reconciliation run");
    }

    fn record_finished(
        &self,
        position: usize,
        total: usize,
        record: &GeoRecord,
        outcome: &RecordOutcome,
    ) {
        match outcome {
            RecordOutcome::Persisted {
                address,
                unknown_location,
            } => info!(
                id = record.id,
                sector = %record.sector,
                position,
                total,
                street = address.street.as_deref(),
                city = address.city.as_deref(),
                zip = address.zip.as_deref(),
                unknown_location,
                "Updated record"
            ),
            RecordOutcome::Skipped => info!(
                id = record.id,
                sector = %record.sector,
                "Record has invalid coordinates, skipping"
            ),
            RecordOutcome::Failed(reason) => warn!(
                id = record.id,
                sector = %record.sector,
                error = %reason,
                "Record failed"
            ),
        }
    }

    fn batch_paused(&self, calls: usize, pause: Duration) {
        info!(calls, pause_ms = pause.as_millis() as u64, "Batch complete, pausing");
    }

    fn run_finished(&self, summary: &RunSummary) {
        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            unknown_location = summary.unknown_location,
            "Processing complete"
        );
        for (sector, counts) in &summary.by_sector {
            info!(
                sector = %sector,
                processed = counts.processed,
                skipped = counts.skipped,
                failed = counts.failed,
                "Sector summary"
            );
        }
    }
}

/// Human-readable report written line by line
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

fn display(field: &AddressField) -> &str {
    field.as_deref().unwrap_or("N/A")
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn line(&self, text: &str) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Console output is best effort
        let _ = writeln!(out, "{}", text);
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn run_started(&self, candidates: &[GeoRecord]) {
        if candidates.is_empty() {
            self.line("No records need geocoding updates");
            return;
        }
        self.line(&format!("Found {} records to process", candidates.len()));
        self.line("Records by sector:");
        for (sector, count) in count_by_sector(candidates) {
            self.line(&format!("  {}: {} records", sector, count));
        }
    }

    fn record_finished(
        &self,
        position: usize,
        total: usize,
        record: &GeoRecord,
        outcome: &RecordOutcome,
    ) {
        let head = format!("[{}/{}] record {} ({})", position, total, record.id, record.sector);
        match outcome {
            RecordOutcome::Persisted {
                unknown_location: true,
                ..
            } => self.line(&format!("  ~ {} coordinates 0,0, address kept empty", head)),
            RecordOutcome::Persisted { address, .. } => self.line(&format!(
                "  + {} street: {}, city: {}, zip: {}",
                head,
                display(&address.street),
                display(&address.city),
                display(&address.zip)
            )),
            RecordOutcome::Skipped => {
                self.line(&format!("  - {} invalid coordinates, skipped", head))
            }
            RecordOutcome::Failed(reason) => self.line(&format!("  ! {} {}", head, reason)),
        }
    }

    fn batch_paused(&self, calls: usize, pause: Duration) {
        self.line(&format!(
            "  .. {} requests sent, pausing for {:.1}s",
            calls,
            pause.as_secs_f64()
        ));
    }

    fn run_finished(&self, summary: &RunSummary) {
        self.line("");
        self.line("Processing complete");
        self.line(&format!("  processed:        {}", summary.processed));
        self.line(&format!("  skipped:          {}", summary.skipped));
        self.line(&format!("  failed:           {}", summary.failed));
        self.line(&format!("  unknown location: {}", summary.unknown_location));
        if summary.by_sector.is_empty() {
            return;
        }
        self.line(&format!(
            "  {:<20} {:>9} {:>7} {:>6}",
            "sector", "processed", "skipped", "failed"
        ));
        for (sector, counts) in &summary.by_sector {
            self.line(&format!(
                "  {:<20} {:>9} {:>7} {:>6}",
                sector, counts.processed, counts.skipped, counts.failed
            ));
        }
    }
}
