//! In-memory fakes shared by the unit tests

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use project_map_db::{AddressField, CandidateFilter, GeoRecord, RawCoordinates, StoredAddress};
use reverse_geocoding::{
    is_unknown_location, GeocodeOutcome, GeocodingError, NormalizedAddress, ReverseGeocoder,
    Transport,
};

use crate::error::Result;
use crate::store::RecordStore;

pub fn record(id: i64, sector: &str, lat: &str, lng: &str) -> GeoRecord {
    GeoRecord {
        id,
        sector: sector.to_string(),
        coordinates: Some(RawCoordinates {
            latitude: lat.to_string(),
            longitude: lng.to_string(),
        }),
        address: StoredAddress::default(),
    }
}

pub fn found(street: &str, city: &str, postal_code: &str) -> GeocodeOutcome {
    GeocodeOutcome::Found(NormalizedAddress {
        street: Some(street.to_string()),
        city: Some(city.to_string()),
        postal_code: Some(postal_code.to_string()),
    })
}

/// Record store kept in a map, with optional per-id write failures
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<i64, GeoRecord>>,
    failing_ids: Mutex<HashSet<i64>>,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn with_records(records: Vec<GeoRecord>) -> Self {
        let store = Self::default();
        {
            let mut map = store.records.lock().unwrap();
            for r in records {
                map.insert(r.id, r);
            }
        }
        store
    }

    pub fn fail_writes_for(&self, id: i64) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    pub fn get(&self, id: i64) -> GeoRecord {
        self.records.lock().unwrap()[&id].clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query_candidates(&self, filter: &CandidateFilter) -> Result<Vec<GeoRecord>> {
        let mut out: Vec<GeoRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.is_candidate() && filter.includes_sector(&r.sector))
            .cloned()
            .collect();
        out.sort_by(|a, b| (&a.sector, a.id).cmp(&(&b.sector, b.id)));
        if let Some(limit) = filter.limit {
            out.truncate(limit as usize);
        }
        Ok(out)
    }

    async fn update_address_fields(&self, id: i64, address: &NormalizedAddress) -> Result<()> {
        if self.failing_ids.lock().unwrap().contains(&id) {
            return Err(sqlx::Error::RowNotFound.into());
        }
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(sqlx::Error::RowNotFound)?;
        record.address.street.merge(address.street.as_deref());
        record.address.city.merge(address.city.as_deref());
        record.address.zip.merge(address.postal_code.as_deref());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Geocoder replaying queued outcomes; the 0,0 sentinel never reaches the queue
#[derive(Default)]
pub struct ScriptedGeocoder {
    outcomes: Mutex<VecDeque<GeocodeOutcome>>,
    pub calls: AtomicUsize,
}

impl ScriptedGeocoder {
    pub fn new(outcomes: Vec<GeocodeOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for ScriptedGeocoder {
    async fn geocode(&self, latitude: f64, longitude: f64) -> GeocodeOutcome {
        if is_unknown_location(latitude, longitude) {
            return GeocodeOutcome::ConfirmedEmpty;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(GeocodeOutcome::Unavailable(GeocodingError::Status {
                status: "SCRIPT_EXHAUSTED".to_string(),
                message: None,
            }))
    }
}

/// Transport answering every request with the same provider body
pub struct CannedTransport {
    body: String,
}

impl CannedTransport {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
        }
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn get(&self, _query: &[(&'static str, String)]) -> reverse_geocoding::Result<String> {
        Ok(self.body.clone())
    }
}

pub fn value(s: &str) -> AddressField {
    AddressField::Value(s.to_string())
}
