use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, warn};

use crate::types::{CandidateFilter, ProjectMapRow};

/// Records with both coordinates present and at least one address key absent.
/// A key holding JSON null counts as resolved.
const CANDIDATE_SELECT: &str = r#"
    SELECT id::bigint AS id, COALESCE(sector, 'unknown') AS sector, data
    FROM project_map
    WHERE data ? 'coordinates'
    AND data->'coordinates'->>'latitude' IS NOT NULL
    AND data->'coordinates'->>'longitude' IS NOT NULL
    AND NOT (data ? 'street' AND data ? 'city' AND data ? 'zip')
"#;

/// Fills each address key unless it already holds a non-null value.
/// `to_jsonb(NULL::text)` is SQL NULL, which `jsonb_build_object` stores as JSON null.
const UPDATE_ADDRESS: &str = r#"
    UPDATE project_map
    SET data = data || jsonb_build_object(
        'street', COALESCE(NULLIF(data->'street', 'null'::jsonb), to_jsonb($2::text)),
        'city', COALESCE(NULLIF(data->'city', 'null'::jsonb), to_jsonb($3::text)),
        'zip', COALESCE(NULLIF(data->'zip', 'null'::jsonb), to_jsonb($4::text))
    )
    WHERE id = $1
"#;

/// Build the candidate query for a filter, ordered by `(sector, id)`.
///
/// Sectors compare with the "C" collation so the order matches byte-wise string ordering.
pub fn candidate_query(filter: &CandidateFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(CANDIDATE_SELECT);

    if !filter.sectors.is_empty() {
        qb.push(" AND COALESCE(sector, 'unknown') = ANY(");
        qb.push_bind(filter.sectors.clone());
        qb.push(")");
    }

    qb.push(" ORDER BY COALESCE(sector, 'unknown') COLLATE \"C\", id");

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ");
        qb.push_bind(limit);
    }

    qb
}

/// Fetch candidate rows
pub async fn select_candidates(
    executor: impl sqlx::PgExecutor<'_>,
    filter: &CandidateFilter,
) -> Result<Vec<ProjectMapRow>, sqlx::Error> {
    let mut qb = candidate_query(filter);
    qb.build_query_as::<ProjectMapRow>()
        .fetch_all(executor)
        .await
}

/// Write the three address keys of one record in a single transaction.
///
/// Fails with `RowNotFound` (and rolls back) if no record has this id.
pub async fn update_address(
    pool: &PgPool,
    id: i64,
    street: Option<&str>,
    city: Option<&str>,
    zip: Option<&str>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(UPDATE_ADDRESS)
        .bind(id)
        .bind(street)
        .bind(city)
        .bind(zip)
        .execute(&mut *tx)
        .await;

    match result {
        Ok(done) if done.rows_affected() == 1 => {
            tx.commit().await?;
            debug!(id, "Address fields updated");
            Ok(())
        }
        Ok(done) => {
            warn!(id, rows = done.rows_affected(), "Address update matched no single row");
            tx.rollback().await?;
            Err(sqlx::Error::RowNotFound)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(id, error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}
