pub mod process_upload;

pub use process_upload::{ProcessUploadCommand, ProcessUploadError, ProcessUploadResponse};
