//! Candidate selection

use std::collections::BTreeMap;

use project_map_db::{CandidateFilter, GeoRecord};
use tracing::info;

use crate::error::Result;
use crate::store::RecordStore;

/// Fetch the records needing enrichment, ordered by `(sector, id)`.
///
/// The candidate predicate, sector scope and cap are re-applied here, so a
/// store that returns a superset still yields exactly the candidates.
pub async fn select_candidates(
    store: &dyn RecordStore,
    filter: &CandidateFilter,
) -> Result<Vec<GeoRecord>> {
    let mut records = store.query_candidates(filter).await?;

    records.retain(|r| r.is_candidate() && filter.includes_sector(&r.sector));
    records.sort_by(|a, b| a.sector.cmp(&b.sector).then(a.id.cmp(&b.id)));
    if let Some(limit) = filter.limit {
        records.truncate(usize::try_from(limit).unwrap_or(0));
    }

    info!("Found {} records to process", records.len());
    for (sector, count) in count_by_sector(&records) {
        info!(sector = %sector, count, "Candidates by sector");
    }

    Ok(records)
}

/// Number of records per sector
pub fn count_by_sector(records: &[GeoRecord]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.sector.as_str()).or_insert(0) += 1;
    }
    counts
}
