//! Content digests for uploaded files

use sha2::{Digest, Sha256};

/// Upper bound on the number of bytes fed into the digest (50 MiB).
///
/// Bytes beyond the cap are truncated, not rejected. This is a resource
/// bound on memory use, not a validation rule.
pub const MAX_CONTENT_BYTES: u64 = 50 * 1024 * 1024;

/// Compute the SHA-256 hex digest of uploaded content.
///
/// Deterministic over the (capped) input bytes, no side effects.
pub fn content_sha256(content: &[u8]) -> String {
    let capped = &content[..content.len().min(MAX_CONTENT_BYTES as usize)];
    let mut hasher = Sha256::new();
    hasher.update(capped);
    hex::encode(hasher.finalize())
}
