/// Compiled-in fallback for `TRIBU_SECRET_KEY`.
///
/// `main` logs a warning when the server starts with this value — fine for
/// local development, not for a deployment.
pub const DEFAULT_SECRET_KEY: &str = "tribu_dev_secret_change_me";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    /// HMAC key for the session cookie JWT.
    pub secret_key: String,
    /// Adds `Secure` to session cookies when true.
    pub https: bool,
    /// JWT lifetime (days) for an ordinary login.
    pub session_days: u32,
    /// JWT lifetime and cookie Max-Age (days) when "remember me" is set.
    pub remember_days: u32,
    /// Argon2id memory cost in KB.
    pub argon2_memory_kb: u32,
    pub duckdb_memory_limit: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("TRIBU_PORT")
                .unwrap_or_else(|_| "3030".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("TRIBU_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            secret_key: std::env::var("TRIBU_SECRET_KEY")
                .unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string()),
            https: std::env::var("TRIBU_HTTPS")
                .map(|v| v == "true")
                .unwrap_or(false),
            session_days: std::env::var("TRIBU_SESSION_DAYS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            remember_days: std::env::var("TRIBU_REMEMBER_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            argon2_memory_kb: std::env::var("TRIBU_ARGON2_MEMORY_KB")
                .unwrap_or_else(|_| "65536".to_string())
                .parse()
                .unwrap_or(65536),
            duckdb_memory_limit: std::env::var("TRIBU_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "256MB".to_string()),
        })
    }
}
