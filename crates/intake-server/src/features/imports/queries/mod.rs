pub mod get_import;

pub use get_import::{GetImportError, GetImportQuery};
