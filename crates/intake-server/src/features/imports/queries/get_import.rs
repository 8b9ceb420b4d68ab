//! Look up one import record by id.

use sqlx::PgPool;
use uuid::Uuid;

use crate::ingest::{records, ImportRecord};

#[derive(Debug, Clone)]
pub struct GetImportQuery {
    pub import_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetImportError {
    #[error("Import with ID '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetImportQuery) -> Result<ImportRecord, GetImportError> {
    records::fetch_import(&pool, query.import_id)
        .await?
        .ok_or(GetImportError::NotFound(query.import_id))
}
