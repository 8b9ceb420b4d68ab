//! Transactional batch loader
//!
//! Persists all parsed rows of one upload as a single all-or-nothing
//! unit of work. Every row gets a brand-new candidate (identity is
//! deliberately not resolved across rows or uploads); contact channels
//! and the application itself are inserted through idempotent
//! `ON CONFLICT DO NOTHING` statements, so overlapping uploads are
//! resolved by the storage engine's uniqueness constraints rather than
//! application-level locks.
//!
//! Any failure other than a benign duplicate aborts the batch: the
//! transaction is rolled back and no row of the upload is persisted.
//! The transaction guard also rolls back on drop, so caller
//! cancellation mid-batch cannot leave it open.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::dedup;
use super::models::ParsedRow;

const CANDIDATE_INSERT: &str = "
    INSERT INTO candidates (candidate_id, first_name, last_name, birth_year, citizenship, languages)
    VALUES ($1, $2, $3, $4, $5, $6)
";

const CONTACT_INSERT: &str = "
    INSERT INTO candidate_contacts (contact_id, candidate_id, type, value, is_primary, normalized)
    VALUES ($1, $2, $3, $4, true, $5)
    ON CONFLICT (type, normalized) DO NOTHING
";

const APPLICATION_INSERT: &str = "
    INSERT INTO applications (
        application_id, candidate_id, import_id, applied_at, resume_url,
        priority1, priority2, course, specialty, specialty_other, schedule,
        city, city_other, university, university_other, source,
        status, status_reason, external_key, raw_row
    )
    VALUES (
        $1, $2, $3, $4, $5,
        $6, $7, $8, $9, $10, $11,
        $12, $13, $14, $15, $16,
        $17, $18, $19, $20
    )
    ON CONFLICT (external_key) DO NOTHING
";

/// Row counts reported by the loader.
///
/// `skipped` covers every zero-rows-affected outcome on the application
/// insert; duplicate dedup keys are not distinguished from other no-ops
/// in the returned counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub inserted: usize,
    pub skipped: usize,
}

/// Outcome of one idempotent contact insert.
///
/// A duplicate (type, normalized) pair is a benign no-op; only real
/// storage faults propagate as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactOutcome {
    Inserted,
    Duplicate,
}

/// Persist all rows of one import in a single transaction.
///
/// Candidate and contact rows for a given parsed row are written before
/// the application row referencing them. A duplicate external key makes
/// the application insert a no-op, counted as skipped.
#[tracing::instrument(skip(pool, rows), fields(rows = rows.len()))]
pub async fn load_rows(
    pool: &PgPool,
    import_id: Uuid,
    rows: &[ParsedRow],
) -> Result<LoadStats, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut stats = LoadStats::default();

    for row in rows {
        let candidate_id = Uuid::new_v4();

        sqlx::query(CANDIDATE_INSERT)
            .bind(candidate_id)
            .bind(&row.first_name)
            .bind(&row.last_name)
            .bind(row.birth_year)
            .bind(null_if_empty(&row.citizenship))
            .bind(null_if_empty(&row.languages))
            .execute(&mut *tx)
            .await?;

        if !row.email.is_empty() {
            insert_contact(&mut tx, candidate_id, "email", &row.email, &row.email).await?;
        }
        if !row.phone.is_empty() {
            insert_contact(&mut tx, candidate_id, "phone", &row.phone, &row.phone).await?;
        }
        if !row.telegram.is_empty() {
            let normalized = row.telegram.trim_start_matches('@').to_lowercase();
            insert_contact(&mut tx, candidate_id, "telegram", &row.telegram, &normalized).await?;
        }

        let key = dedup::external_key(row);
        let result = sqlx::query(APPLICATION_INSERT)
            .bind(Uuid::new_v4())
            .bind(candidate_id)
            .bind(import_id)
            .bind(row.applied_at)
            .bind(null_if_empty(&row.resume_url))
            .bind(null_if_empty(&row.priority1))
            .bind(null_if_empty(&row.priority2))
            .bind(null_if_empty(&row.course))
            .bind(null_if_empty(&row.specialty))
            .bind(null_if_empty(&row.specialty_other))
            .bind(null_if_empty(&row.schedule))
            .bind(null_if_empty(&row.city))
            .bind(null_if_empty(&row.city_other))
            .bind(null_if_empty(&row.university))
            .bind(null_if_empty(&row.university_other))
            .bind(null_if_empty(&row.source))
            .bind("NEW")
            .bind(Option::<String>::None)
            .bind(&key)
            .bind(serde_json::Value::Object(row.raw_row.clone()))
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            stats.skipped += 1;
        } else {
            stats.inserted += 1;
        }
    }

    tx.commit().await?;

    Ok(stats)
}

async fn insert_contact(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: Uuid,
    channel: &str,
    value: &str,
    normalized: &str,
) -> Result<ContactOutcome, sqlx::Error> {
    let result = sqlx::query(CONTACT_INSERT)
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(channel)
        .bind(value)
        .bind(normalized)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        debug!(%candidate_id, channel, "contact already exists, skipping");
        Ok(ContactOutcome::Duplicate)
    } else {
        Ok(ContactOutcome::Inserted)
    }
}

fn null_if_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
