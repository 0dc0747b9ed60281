//! Reconciliation pipeline: geocode, merge and persist each candidate in turn
//!
//! Per record: `Selected -> CoordinatesValidated -> Geocoded -> Merged -> Persisted`,
//! leaving early as skipped (bad coordinates) or failed (provider unavailable,
//! write rejected). Records are processed strictly one at a time and a failure
//! never stops the run.

use project_map_db::{GeoRecord, RawCoordinates, StoredAddress};
use reverse_geocoding::{is_unknown_location, GeocodeOutcome, NormalizedAddress, ReverseGeocoder};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::reporter::Reporter;
use crate::store::RecordStore;
use crate::types::{FailureReason, PipelineConfig, RecordOutcome, RunSummary};

pub struct ReconciliationPipeline<'a> {
    store: &'a dyn RecordStore,
    geocoder: &'a dyn ReverseGeocoder,
    reporter: &'a dyn Reporter,
    config: PipelineConfig,
}

/// Fill the fields of `current` that hold no string yet
fn merge(current: &StoredAddress, resolved: &NormalizedAddress) -> StoredAddress {
    let mut merged = current.clone();
    merged.street.merge(resolved.street.as_deref());
    merged.city.merge(resolved.city.as_deref());
    merged.zip.merge(resolved.postal_code.as_deref());
    merged
}

impl<'a> ReconciliationPipeline<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        geocoder: &'a dyn ReverseGeocoder,
        reporter: &'a dyn Reporter,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            geocoder,
            reporter,
            config,
        }
    }

    /// Process every record in order and return the run's counts
    pub async fn run(&self, records: &[GeoRecord]) -> RunSummary {
        let total = records.len();
        let mut summary = RunSummary::new(total);
        let mut calls = 0usize;

        self.reporter.run_started(records);

        for (i, record) in records.iter().enumerate() {
            debug!(
                id = record.id,
                sector = %record.sector,
                "Processing record {}/{}",
                i + 1,
                total
            );

            let (outcome, called_provider) = self.process_record(record).await;
            summary.record(&record.sector, &outcome);
            self.reporter.record_finished(i + 1, total, record, &outcome);

            // Only real provider calls count against the quota
            if called_provider {
                calls += 1;
                sleep(self.config.request_delay).await;
                if self.config.batch_size > 0 && calls % self.config.batch_size == 0 {
                    self.reporter.batch_paused(calls, self.config.batch_pause);
                    sleep(self.config.batch_pause).await;
                }
            }
        }

        summary.finish();
        self.reporter.run_finished(&summary);
        summary
    }

    /// Drive one record to a terminal state.
    ///
    /// Returns whether an outbound geocoding call was made.
    async fn process_record(&self, record: &GeoRecord) -> (RecordOutcome, bool) {
        let Some(coords) = record.coordinates.as_ref().and_then(RawCoordinates::parse) else {
            info!(id = record.id, sector = %record.sector, "Invalid coordinates, skipping");
            return (RecordOutcome::Skipped, false);
        };

        let unknown_location = is_unknown_location(coords.latitude, coords.longitude);
        let called_provider = !unknown_location;

        let resolved = match self.geocoder.geocode(coords.latitude, coords.longitude).await {
            GeocodeOutcome::Found(address) => address,
            GeocodeOutcome::ConfirmedEmpty => NormalizedAddress::default(),
            GeocodeOutcome::Unavailable(e) => {
                return (
                    RecordOutcome::Failed(FailureReason::GeocodeUnavailable(e)),
                    called_provider,
                );
            }
        };

        let merged = merge(&record.address, &resolved);
        let patch = NormalizedAddress {
            street: merged.street.as_deref().map(str::to_string),
            city: merged.city.as_deref().map(str::to_string),
            postal_code: merged.zip.as_deref().map(str::to_string),
        };

        let outcome = match self.store.update_address_fields(record.id, &patch).await {
            Ok(()) => RecordOutcome::Persisted {
                address: merged,
                unknown_location,
            },
            Err(e) => RecordOutcome::Failed(FailureReason::PersistFailed(e)),
        };
        (outcome, called_provider)
    }
}
