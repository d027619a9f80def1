/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent). There is no migration mechanism beyond this.
///
/// `memory_limit` is a DuckDB size string such as `"256MB"`, read from
/// `Config.duckdb_memory_limit` (env `TRIBU_DUCKDB_MEMORY`). Always set an
/// explicit limit — the DuckDB default (80% of system RAM) is not acceptable
/// for a server process. `SET threads = 2` bounds the background thread pool
/// for single-writer embedded use.
///
/// The column names (`nombre`, `primer_apellido`, ...) are kept from the
/// original deployment's schema so an existing database file keeps working.
/// DuckDB has no SQLite-style AUTOINCREMENT; the surrogate id comes from a
/// sequence default instead.
///
/// The three UNIQUE columns (`telefono`, `email`, `usuario`) are the sole
/// authority for uniqueness — the store layer never pre-checks them before
/// a write.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

CREATE SEQUENCE IF NOT EXISTS users_id_seq;

CREATE TABLE IF NOT EXISTS users (
    id               BIGINT PRIMARY KEY DEFAULT nextval('users_id_seq'),
    nombre           VARCHAR NOT NULL,
    primer_apellido  VARCHAR NOT NULL,
    segundo_apellido VARCHAR,
    telefono         VARCHAR NOT NULL UNIQUE,
    email            VARCHAR NOT NULL UNIQUE,
    usuario          VARCHAR NOT NULL UNIQUE,
    password_hash    VARCHAR NOT NULL
);
"#
    )
}
