// src/main.rs
use anyhow::Result;
use dependency_health::{
    config, logging,
    metrics::MetricsRegistry,
    server::{HealthHandler, MetricsHandler, ServerBuilder},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    let config = config::load_config(&config_path).await?;

    // An explicit RUST_LOG replaces the configured level entirely.
    logging::init(config.log_level())?;

    info!(
        environment = ?config.environment,
        "Loaded configuration from: {}", config_path
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut builder = config.aggregator_builder()?;
    if config.metrics.enabled {
        let registry = Arc::new(MetricsRegistry::new()?);
        builder = builder.with_metrics(registry.collector());

        let metrics_addr = SocketAddr::new(config.server.host, config.metrics.port);
        let handler = MetricsHandler::new(registry, config.metrics.path.clone());
        let shutdown = wait_for_shutdown(shutdown_rx.clone());
        info!(
            "Metrics server listening on http://{}{}",
            metrics_addr, config.metrics.path
        );
        tokio::spawn(async move {
            let server = ServerBuilder::new(metrics_addr).with_handler(handler);
            if let Err(e) = server.serve_with_shutdown(shutdown).await {
                error!("Metrics server error: {:#}", e);
            }
        });
    }

    let aggregator = builder.build();
    info!(
        checks = ?aggregator.check_names(),
        "Health aggregator ready, version {}",
        aggregator.version()
    );

    let handler = HealthHandler::new(aggregator, config.server.path.clone());

    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    ServerBuilder::new(config.server.addr())
        .with_handler(handler)
        .serve_with_shutdown(wait_for_shutdown(shutdown_rx))
        .await?;

    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            break;
        }
    }
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
