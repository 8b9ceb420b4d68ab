//! Deduplication key derivation
//!
//! The key is the application's semantic identity for idempotent
//! re-import: two rows with identical (primary contact, applied
//! timestamp, both priorities) always yield the same key regardless of
//! any other field.

use chrono::SecondsFormat;
use sha2::{Digest, Sha256};

use super::models::ParsedRow;

const KEY_DELIMITER: &str = "|";

/// Derive the deterministic external key for a parsed row.
///
/// Primary identity is the normalized email when non-empty, otherwise
/// the normalized phone; the applied timestamp is rendered as UTC
/// RFC 3339 at second precision.
pub fn external_key(row: &ParsedRow) -> String {
    let primary = if row.email.trim().is_empty() {
        row.phone.trim()
    } else {
        row.email.trim()
    };

    let payload = [
        primary,
        &row.applied_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        row.priority1.trim(),
        row.priority2.trim(),
    ]
    .join(KEY_DELIMITER);

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}
