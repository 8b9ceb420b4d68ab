//! Process one uploaded XLSX export end to end.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::ingest::{loader, parser, records, xlsx, ImportError, ImportRecord, ImportStatus};
use intake_common::checksum::{content_sha256, MAX_CONTENT_BYTES};

#[derive(Debug, Clone)]
pub struct ProcessUploadCommand {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Outcome reported to the caller for one upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessUploadResponse {
    pub import_id: Uuid,
    pub file_sha256: String,
    pub total_rows: usize,
    pub inserted_rows: usize,
    pub skipped_rows: usize,
    /// Ordered row-level diagnostics for rows that never reached
    /// persistence; these do not influence the counters above.
    pub diagnostics: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessUploadError {
    #[error("Filename is required and cannot be empty")]
    FilenameRequired,
    #[error("Uploaded file is empty")]
    ContentRequired,
    #[error(transparent)]
    Import(#[from] ImportError),
}

impl From<sqlx::Error> for ProcessUploadError {
    fn from(err: sqlx::Error) -> Self {
        Self::Import(ImportError::Database(err))
    }
}

impl ProcessUploadCommand {
    pub fn validate(&self) -> Result<(), ProcessUploadError> {
        if self.filename.trim().is_empty() {
            return Err(ProcessUploadError::FilenameRequired);
        }
        if self.content.is_empty() {
            return Err(ProcessUploadError::ContentRequired);
        }
        Ok(())
    }
}

/// Run the full pipeline for one upload: digest the bytes, create the
/// import record, decode and parse the sheet, load all surviving rows
/// in one transaction, and finalize the record.
///
/// The terminal record write is best-effort: its own failure is logged
/// and the processing outcome (success or the original error) is what
/// the caller sees.
#[tracing::instrument(skip(pool, command), fields(filename = %command.filename, size = command.content.len()))]
pub async fn handle(
    pool: PgPool,
    command: ProcessUploadCommand,
) -> Result<ProcessUploadResponse, ProcessUploadError> {
    command.validate()?;

    // Oversized uploads are truncated to the digest cap, not rejected.
    let content = &command.content[..command.content.len().min(MAX_CONTENT_BYTES as usize)];
    let file_sha256 = content_sha256(content);

    let record = ImportRecord::new(command.filename.clone(), file_sha256.clone());
    records::create_import(&pool, &record).await?;

    let outcome = match xlsx::decode_first_sheet(content).and_then(|sheet| {
        parser::parse_sheet(&sheet)
    }) {
        Ok(outcome) => outcome,
        Err(err) => {
            finalize_best_effort(&pool, record.import_id, ImportStatus::Failed, 0, 0, 0).await;
            return Err(err.into());
        }
    };

    let stats = match loader::load_rows(&pool, record.import_id, &outcome.rows).await {
        Ok(stats) => stats,
        Err(err) => {
            // The transaction rolled back, so nothing of this batch is
            // durable; counters reflect that.
            finalize_best_effort(
                &pool,
                record.import_id,
                ImportStatus::Failed,
                outcome.total_rows as i32,
                0,
                0,
            )
            .await;
            return Err(ImportError::Database(err).into());
        }
    };

    finalize_best_effort(
        &pool,
        record.import_id,
        ImportStatus::Parsed,
        outcome.total_rows as i32,
        stats.inserted as i32,
        stats.skipped as i32,
    )
    .await;

    tracing::info!(
        import_id = %record.import_id,
        total = outcome.total_rows,
        inserted = stats.inserted,
        skipped = stats.skipped,
        diagnostics = outcome.diagnostics.len(),
        "Import processed"
    );

    Ok(ProcessUploadResponse {
        import_id: record.import_id,
        file_sha256,
        total_rows: outcome.total_rows,
        inserted_rows: stats.inserted,
        skipped_rows: stats.skipped,
        diagnostics: outcome.diagnostics,
    })
}

async fn finalize_best_effort(
    pool: &PgPool,
    import_id: Uuid,
    status: ImportStatus,
    total: i32,
    inserted: i32,
    skipped: i32,
) {
    if let Err(err) =
        records::finalize_import(pool, import_id, status, total, inserted, skipped).await
    {
        tracing::warn!(%import_id, %status, "failed to finalize import record: {err}");
    }
}
