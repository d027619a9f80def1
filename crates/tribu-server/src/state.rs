use std::sync::Arc;

use tribu_accounts::UserStore;
use tribu_core::config::Config;
use tribu_duckdb::DuckDbBackend;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Both fields are `Arc`-wrapped and cheap to clone. There is no other
/// cross-request shared mutable state: each request carries its own session
/// context, and all user data lives behind the store.
pub struct AppState {
    /// The DuckDB-backed user store. Internally uses
    /// `Arc<tokio::sync::Mutex<Connection>>` so it is already async-safe.
    pub db: Arc<DuckDbBackend>,

    /// Parsed configuration, loaded once at startup from environment
    /// variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
        }
    }

    /// The store as a trait object, the way the account flows consume it.
    pub fn store(&self) -> &dyn UserStore {
        self.db.as_ref()
    }
}
