use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};

use inventory_gateway as gateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = gateway::config::load_config()?;
    gateway::config::init_tracing(cfg.log_level(), cfg.log_json);

    let credentials = gateway::config::Credentials::load(&cfg.env_file);
    if credentials.is_configured() {
        info!(?credentials, "Airtable credentials loaded");
    } else {
        warn!(
            ?credentials,
            missing = ?credentials.missing_vars(),
            "Airtable credentials incomplete; read requests will fail until they are set"
        );
    }

    let table = gateway::services::HttpTableClient::from_config(&cfg)?;
    let state = gateway::AppState::new(credentials, Arc::new(table));
    let app = gateway::app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.host, cfg.port))?;
    info!(environment = %cfg.environment, "inventory-gateway listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
