//! drugscope API server
//!
//! Run with: cargo run -p drugscope-web

use std::sync::Arc;

use drugscope_config::Config;
use drugscope_db::{ConnectionManager, PgBackend};
use drugscope_query::DrugExplorer;
use drugscope_web::{router::build_router, state::AppState};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            init_tracing("info");
            error!("Configuration error: {e}");
            error!("Set DB_HOST, DB_PORT, DB_NAME, DB_USER and DB_PASSWORD (or drugscope.toml).");
            return Err(e.into());
        }
    };
    init_tracing(&config.logging.filter);

    info!("Starting drugscope {}", env!("CARGO_PKG_VERSION"));
    info!(
        database = %config.database.redacted_url(),
        search_limit = config.query.search_limit,
        pool_max = config.pool.max_size,
        "Configuration loaded"
    );

    // Pool creation does not connect; an unreachable store only degrades the link.
    let backend = PgBackend::connect(&config.database, &config.pool, &config.query)?;
    let manager = Arc::new(ConnectionManager::new(Arc::new(backend), &config.query));

    if manager.probe().await {
        match manager.check_schema().await {
            Ok(()) => info!("Backend reachable, schema verified"),
            Err(e) => error!("Schema check failed: {e}"),
        }
    } else {
        warn!("Backend unreachable at startup; requests report it unavailable until it returns");
    }

    let explorer = DrugExplorer::new(manager, &config.query);
    let app = build_router(AppState::new(explorer));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
