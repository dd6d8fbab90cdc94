//! Sweet Control - sales API with operational metrics
//!
//! Composition root that wires configuration, the connection acquirer, the
//! storage adapter, the metrics registry and the HTTP server.

use std::sync::Arc;

use sweetcontrol::adapters::inbound::{build_router, AppState};
use sweetcontrol::adapters::outbound::MySqlSaleRepository;
use sweetcontrol::application::SalesService;
use sweetcontrol::config::load_config;
use sweetcontrol::infrastructure::db_pool::PoolAcquirer;
use sweetcontrol::infrastructure::metrics::AppMetrics;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = load_config()?;

    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!("starting Sweet Control listen={}", cfg.listen_addr);

    // ===== COMPOSITION ROOT =====

    let acquirer = Arc::new(PoolAcquirer::new(cfg.db.clone()));
    let repository = Arc::new(MySqlSaleRepository::new(acquirer));
    let metrics = Arc::new(AppMetrics::new()?);
    let sales = Arc::new(SalesService::new(repository.clone(), metrics.clone()));

    let state = AppState { sales, metrics };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("HTTP server listening on {}", cfg.listen_addr);

    // Bootstrap runs behind the bound listener: the API serves while the
    // acquirer retries an unreachable database. A bootstrap failure is
    // logged; requests keep surfacing storage errors until it recovers.
    tokio::spawn(async move {
        if let Err(e) = repository.initialize().await {
            tracing::error!(error = ?e, "database bootstrap failed");
        }
    });

    axum::serve(listener, app).await?;
    Ok(())
}
