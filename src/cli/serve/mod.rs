//! Serve command - runs the HTTP API

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use crate::api::create_router_with_state;
use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::observability::{create_metrics_router, init_metrics};
use crate::infrastructure::verification::VerificationService;

const CODE_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    init_logging(&config.logging);

    let state = crate::create_app_state_with_config(&config).await?;
    let purge_task = tokio::spawn(purge_codes_periodically(state.verification_service.clone()));

    let mut app: Router = create_router_with_state(state);
    if let Some(metrics) = init_metrics(&config.metrics) {
        app = app.merge(create_metrics_router(metrics));
    }

    let addr = build_socket_addr(&config)?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "IPTV gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge_task.abort();
    info!("Server shutdown complete");

    Ok(())
}

async fn purge_codes_periodically(service: Arc<VerificationService>) {
    let mut interval = tokio::time::interval(CODE_PURGE_INTERVAL);

    loop {
        interval.tick().await;

        if let Err(e) = service.purge_expired().await {
            warn!(error = %e, "Verification code purge failed");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_socket_addr() {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9000;

        assert_eq!(
            build_socket_addr(&config).unwrap(),
            "127.0.0.1:9000".parse::<SocketAddr>().unwrap()
        );

        config.server.host = "not-an-ip".to_string();
        assert!(build_socket_addr(&config).is_err());
    }
}
