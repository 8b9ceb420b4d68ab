//! Import lifecycle records
//!
//! An import record is created with status `CREATED` before any row is
//! parsed and mutated exactly once more, to a terminal `PARSED` or
//! `FAILED` with the final counters.

use sqlx::PgPool;
use uuid::Uuid;

use super::models::{ImportRecord, ImportStatus};

/// Insert the record at upload acceptance (status `CREATED`).
pub async fn create_import(pool: &PgPool, record: &ImportRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "
        INSERT INTO imports (import_id, uploaded_by, file_name, file_sha256, status,
                             total_rows, inserted_rows, skipped_rows)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(record.import_id)
    .bind(Option::<Uuid>::None)
    .bind(&record.file_name)
    .bind(&record.file_sha256)
    .bind(&record.status)
    .bind(record.total_rows)
    .bind(record.inserted_rows)
    .bind(record.skipped_rows)
    .execute(pool)
    .await?;

    Ok(())
}

/// Write the terminal status and final counters.
///
/// Callers treat this write as best-effort on the failure path: if it
/// fails, the original processing error is what surfaces.
pub async fn finalize_import(
    pool: &PgPool,
    import_id: Uuid,
    status: ImportStatus,
    total: i32,
    inserted: i32,
    skipped: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "
        UPDATE imports
        SET status = $2, total_rows = $3, inserted_rows = $4, skipped_rows = $5
        WHERE import_id = $1
        ",
    )
    .bind(import_id)
    .bind(status.as_str())
    .bind(total)
    .bind(inserted)
    .bind(skipped)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch an import record by id.
pub async fn fetch_import(
    pool: &PgPool,
    import_id: Uuid,
) -> Result<Option<ImportRecord>, sqlx::Error> {
    sqlx::query_as::<_, ImportRecord>(
        "
        SELECT import_id, file_name, file_sha256, status,
               total_rows, inserted_rows, skipped_rows
        FROM imports
        WHERE import_id = $1
        ",
    )
    .bind(import_id)
    .fetch_optional(pool)
    .await
}
