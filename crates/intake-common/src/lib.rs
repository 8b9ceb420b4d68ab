//! Intake Common Library
//!
//! Shared utilities for the intake workspace:
//!
//! - **Error Handling**: common error and result types
//! - **Checksums**: content digests for uploaded files
//! - **Logging**: explicitly constructed logging configuration
//!
//! # Example
//!
//! ```
//! use intake_common::checksum::content_sha256;
//!
//! let digest = content_sha256(b"hello world");
//! assert_eq!(digest.len(), 64);
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{IntakeError, Result};
