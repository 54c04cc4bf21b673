//! Fitonex API - Main application entry point
//!
//! This application starts the HTTP API server.

use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;

use fitonex::{Config, create_app, init_tracing};
use fitonex_core::config::{RateLimitConfig, RateLimitStorageBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_server().await
}

/// Run the HTTP server
async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if it's not a "file not found" error
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Load configuration (validated on load)
    let config = Config::load().map_err(|e| {
        std::io::Error::other(format!(
            "Failed to load configuration. Check REDIS_URL and FITONEX__* env vars: {}",
            e
        ))
    })?;

    // Initialize tracing (after config is loaded so we can use logging config)
    init_tracing(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting FitONEX API server"
    );
    log_rate_limit_setup(&config.rate_limit);

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    let app_handle = create_app(config).await.map_err(|e| {
        Box::new(std::io::Error::other(format!(
            "Failed to create application: {}",
            e
        )))
    })?;

    // Create server address
    let addr = SocketAddr::new(server_host.parse()?, server_port);

    tracing::info!("Server listening on {}", addr);

    // Start server with graceful shutdown
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app_handle.router)
        .with_graceful_shutdown(shutdown_signal(app_handle.shutdown_token))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Report which store enforces the protected endpoint limits
fn log_rate_limit_setup(rate_limit: &RateLimitConfig) {
    if !rate_limit.enabled {
        tracing::warn!("Rate limiting disabled: video uploads and reports are unthrottled");
        return;
    }

    let backend = rate_limit.storage_backend.as_str();
    for (name, bucket) in [
        ("video_upload", &rate_limit.video_upload),
        ("reports", &rate_limit.reports),
    ] {
        tracing::info!(
            endpoint = name,
            backend,
            rate = bucket.rate,
            interval_seconds = bucket.interval_seconds,
            "Rate limit configured"
        );
    }

    if rate_limit.storage_backend == RateLimitStorageBackend::Memory {
        tracing::warn!("In-memory rate limiting: limits apply per instance, not across the fleet");
    }
    if rate_limit.trust_user_id_header {
        tracing::warn!("Trusting the x-user-id header as caller identity; it must be set by a gateway");
    }
}

/// Handle graceful shutdown signals and cancel background tasks
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }

    tracing::info!("Cancelling background tasks...");
    shutdown_token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_setup_report_covers_every_mode() {
        let memory = RateLimitConfig {
            storage_backend: RateLimitStorageBackend::Memory,
            trust_user_id_header: true,
            ..RateLimitConfig::default()
        };
        let disabled = RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        };

        for config in [RateLimitConfig::default(), memory, disabled] {
            log_rate_limit_setup(&config);
        }
    }
}
