pub mod backend;
pub mod schema;
mod users;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `tribu_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
