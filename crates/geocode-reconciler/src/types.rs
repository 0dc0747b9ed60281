//! Core types for the geocode reconciler

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use project_map_db::StoredAddress;
use reverse_geocoding::GeocodingError;
use serde::Serialize;

use crate::error::ReconcilerError;

/// Pacing of a reconciliation run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Outbound provider calls between long pauses. Counts calls, not
    /// records: skipped and 0,0 records do not advance it.
    pub batch_size: usize,
    /// Sleep after every outbound call
    pub request_delay: Duration,
    /// Extra sleep after every `batch_size`-th call
    pub batch_pause: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            request_delay: Duration::from_millis(100),
            batch_pause: Duration::from_millis(1000),
        }
    }
}

/// Why a record ended in the failed state
#[derive(Debug)]
pub enum FailureReason {
    GeocodeUnavailable(GeocodingError),
    PersistFailed(ReconcilerError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::GeocodeUnavailable(e) => write!(f, "geocoding unavailable: {}", e),
            FailureReason::PersistFailed(e) => write!(f, "persist failed: {}", e),
        }
    }
}

/// Terminal state of one record
#[derive(Debug)]
pub enum RecordOutcome {
    /// Address merged and written
    Persisted {
        address: StoredAddress,
        /// Coordinates were the 0,0 sentinel; nothing was looked up
        unknown_location: bool,
    },
    /// Coordinates missing, non-numeric or out of range
    Skipped,
    Failed(FailureReason),
}

/// Per-sector tallies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectorCounts {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Counts from one reconciliation run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub candidates: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Subset of `processed` written as empty because of the 0,0 sentinel
    pub unknown_location: usize,
    pub by_sector: BTreeMap<String, SectorCounts>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(candidates: usize) -> Self {
        Self {
            candidates,
            processed: 0,
            skipped: 0,
            failed: 0,
            unknown_location: 0,
            by_sector: BTreeMap::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, sector: &str, outcome: &RecordOutcome) {
        let counts = self.by_sector.entry(sector.to_string()).or_default();
        match outcome {
            RecordOutcome::Persisted {
                unknown_location, ..
            } => {
                self.processed += 1;
                counts.processed += 1;
                if *unknown_location {
                    self.unknown_location += 1;
                }
            }
            RecordOutcome::Skipped => {
                self.skipped += 1;
                counts.skipped += 1;
            }
            RecordOutcome::Failed(_) => {
                self.failed += 1;
                counts.failed += 1;
            }
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}
