//! Intake Server Library
//!
//! HTTP service that ingests spreadsheet-based candidate applications
//! into PostgreSQL.
//!
//! # Overview
//!
//! - **Ingestion pipeline** (`ingest`): workbook decoding, row parsing
//!   with per-row diagnostics, deterministic deduplication keys, and a
//!   single-transaction batch loader that makes re-imports idempotent.
//! - **API** (`features`): feature slices exposing the upload operation
//!   and import status lookup under `/api/v1`.
//! - **Configuration**: environment-based with local defaults.
//!
//! # Framework Stack
//!
//! - **Axum**: HTTP routing and multipart extraction
//! - **SQLx**: PostgreSQL pool, transactions, and migrations
//! - **Tower**: middleware (request tracing, CORS)

pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;

// Re-export commonly used types
pub use error::AppError;
