//! # Hearth Binary
//!
//! The entry point that assembles the application from its adapters.

#[cfg(not(all(feature = "web-axum", feature = "db-sqlite", feature = "auth-jwt")))]
compile_error!("hearth needs the web-axum, db-sqlite and auth-jwt features");

use std::sync::Arc;

use anyhow::Context;
use api_adapters::AppState;
use auth_adapters::JwtIdentityProvider;
use configs::{LogFormat, LogSettings, Settings};
use secrecy::ExposeSecret;
use storage_adapters::SqliteStore;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);
    settings.announce();

    // 1. Storage
    let store = SqliteStore::open(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("opening database {}", settings.database.url))?;
    let store = Arc::new(store);

    // 2. Identity
    let identity = Arc::new(JwtIdentityProvider::new(
        settings.identity.secret.expose_secret().as_bytes(),
        settings.identity.issuer.as_deref(),
        settings.identity.leeway_secs,
    ));

    // 3. HTTP
    let app = api_adapters::router(AppState::new(store.clone(), identity));

    let address = settings.server.address();
    let listener = TcpListener::bind(&address).await.with_context(|| format!("binding {address}"))?;
    info!("Hearth listening on http://{address}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.context("serving HTTP")?;

    store.close().await;
    info!("Hearth stopped");
    Ok(())
}

/// `RUST_LOG` overrides the configured filter.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
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
}
