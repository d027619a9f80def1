use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use tribu_accounts::password::hash_password;

use crate::schema::init_sql;

/// Seeded default account, inserted only into an empty database.
/// Display name "Admin User", password "password123".
const SEED_ADMIN: (&str, &str, &str, &str, &str) =
    ("Admin", "User", "12345678", "admin@app.com", "admin");
const SEED_ADMIN_PASSWORD: &str = "password123";

/// A DuckDB backend for the user store.
///
/// DuckDB is single-writer: concurrent reads are fine, but concurrent writes
/// cause contention. We wrap the connection in `Arc<Mutex<_>>` so the async
/// runtime serialises writes while the struct stays cheap to clone and share
/// across Axum handlers. Each store operation locks the connection for its
/// own duration only and releases it on every exit path.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// Runs the idempotent schema init SQL so the `users` table and its id
    /// sequence exist. `memory_limit` is a DuckDB size string such as
    /// `"256MB"`, read from `Config.duckdb_memory_limit` at the call site.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for tests only — data is discarded when the struct is
    /// dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Cheap liveness probe for the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.prepare("SELECT 1")?.query_row([], |_| Ok(()))?;
        Ok(())
    }

    /// Seed the default admin account if — and only if — the users table is
    /// empty. Returns true when a row was inserted.
    ///
    /// The seed password is hashed with the same argon2id configuration as
    /// every other account; `argon2_m_cost` comes from the config so tests
    /// can pass a low cost.
    pub async fn seed_default_admin(&self, argon2_m_cost: u32) -> Result<bool> {
        // Hash before taking the lock; argon2 is deliberately slow.
        let password_hash = hash_password(SEED_ADMIN_PASSWORD, argon2_m_cost)?;

        let conn = self.conn.lock().await;
        let count: i64 = conn
            .prepare("SELECT COUNT(*) FROM users")?
            .query_row([], |row| row.get(0))?;
        if count > 0 {
            return Ok(false);
        }

        let (nombre, primer_apellido, telefono, email, usuario) = SEED_ADMIN;
        conn.execute(
            "INSERT INTO users (nombre, primer_apellido, segundo_apellido, telefono, email, usuario, password_hash) \
             VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?6)",
            duckdb::params![nombre, primer_apellido, telefono, email, usuario, password_hash],
        )?;
        info!("Seeded default admin account ({email})");
        Ok(true)
    }
}
