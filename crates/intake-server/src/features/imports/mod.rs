//! Import feature slice: XLSX upload processing and status lookup.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::imports_routes;
