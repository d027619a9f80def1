use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use tribu_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tribu=info".parse()?),
        )
        .json()
        .init();

    let cfg = tribu_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    if cfg.secret_key == tribu_core::config::DEFAULT_SECRET_KEY {
        tracing::warn!(
            "TRIBU_SECRET_KEY not set — session cookies are signed with the \
             built-in development secret"
        );
    }

    // Ensure the data directory exists before opening DuckDB.
    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = format!("{}/tribu.db", cfg.data_dir);

    // Open DuckDB — idempotently initialises the users schema.
    let db = tribu_duckdb::DuckDbBackend::open(&db_path, &cfg.duckdb_memory_limit)?;

    // Seed the default admin account into an empty database so the server is
    // usable out of the box.
    match db.seed_default_admin(cfg.argon2_memory_kb).await {
        Ok(true) => info!("Default account ready (admin@app.com / admin)"),
        Ok(false) => {}
        Err(e) => tracing::error!(error = %e, "Failed to seed default account"),
    }

    let state = Arc::new(AppState::new(db, cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = tribu_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "tribu listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
