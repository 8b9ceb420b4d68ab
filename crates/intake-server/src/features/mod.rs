//! Feature modules implementing the intake API
//!
//! Each feature is a vertical slice with its own `commands/`,
//! `queries/`, and `routes.rs`. Handlers are invoked directly by the
//! routes; write operations go through command handlers, reads through
//! query handlers.

pub mod imports;

use axum::Router;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
}

/// Creates the main API router with all feature routes mounted
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/imports", imports::imports_routes().with_state(state.db))
}
