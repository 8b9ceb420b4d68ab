//! XLSX candidate-application ingestion pipeline
//!
//! One upload is processed as a single logical unit of work:
//!
//! 1. [`intake_common::checksum`] digests the raw bytes and
//!    [`records`] creates the import record (status `CREATED`).
//! 2. [`xlsx`] decodes the workbook into ordered rows of string cells.
//! 3. [`parser`] maps the header row, normalizes each data row, and
//!    accumulates row-level diagnostics for rows that never reach
//!    persistence.
//! 4. [`loader`] persists all surviving rows in one transaction, using
//!    the [`dedup`] key as a per-row idempotency guard.
//! 5. [`records`] finalizes the import record (`PARSED` or `FAILED`).
//!
//! Everything before the loader is pure in-memory computation, so
//! multiple uploads may proceed concurrently without coordination; the
//! storage layer's uniqueness constraints resolve overlapping data.

pub mod dedup;
pub mod error;
pub mod loader;
pub mod models;
pub mod parser;
pub mod records;
pub mod xlsx;

pub use error::ImportError;
pub use loader::LoadStats;
pub use models::{ImportRecord, ImportStatus, ParsedRow};
