//! Fatal import errors
//!
//! These abort the whole import; nothing beyond the initial `CREATED`
//! record is persisted. Row-level problems are not errors — they are
//! accumulated as diagnostics by the parser and processing continues.

use thiserror::Error;

/// Errors that abort an entire import.
///
/// Each kind maps to a distinct user-facing message at the HTTP
/// boundary.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("uploaded file could not be read")]
    FileUnreadable,

    #[error("uploaded file is not a valid workbook")]
    InvalidWorkbook(String),

    #[error("workbook contains no sheets")]
    NoSheetsFound,

    #[error("workbook contains no data rows")]
    NoDataRows,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
