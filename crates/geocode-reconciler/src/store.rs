//! Record store seam and its PostgreSQL implementation

use async_trait::async_trait;
use project_map_db::{CandidateFilter, GeoRecord};
use reverse_geocoding::NormalizedAddress;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::error::Result;

/// Query and patch access to the structured record collection
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records matching the candidate predicate, in `(sector, id)` order
    async fn query_candidates(&self, filter: &CandidateFilter) -> Result<Vec<GeoRecord>>;

    /// Atomically write the three address fields of one record
    async fn update_address_fields(&self, id: i64, address: &NormalizedAddress) -> Result<()>;
}

/// PostgreSQL-backed record store
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database.
    ///
    /// The run is strictly sequential, so one connection is enough.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        info!("Database connection established");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        project_map_db::migrate::migrate(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn query_candidates(&self, filter: &CandidateFilter) -> Result<Vec<GeoRecord>> {
        let rows = project_map_db::records::select_candidates(&self.pool, filter).await?;
        Ok(rows.into_iter().map(GeoRecord::from).collect())
    }

    async fn update_address_fields(&self, id: i64, address: &NormalizedAddress) -> Result<()> {
        project_map_db::records::update_address(
            &self.pool,
            id,
            address.street.as_deref(),
            address.city.as_deref(),
            address.postal_code.as_deref(),
        )
        .await?;
        Ok(())
    }
}
