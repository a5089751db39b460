//! News Volume Reducer: binary entrypoint.
//! Boots the Axum HTTP server around the filtering engine, wiring config,
//! hot reload, metrics and the in-memory article store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_volume_reducer::api::{self, AppState};
use news_volume_reducer::config::{FilterConfig, DEFAULT_CONFIG_PATH};
use news_volume_reducer::metrics::Metrics;
use news_volume_reducer::reducer::{start_hot_reload_thread, ReducerHandle, VolumeReducer};
use news_volume_reducer::store::InMemoryArticleStore;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8002";
const STORE_CAPACITY: usize = 50_000;

/// `RUST_LOG` filter (default `info`), compact output unless `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    init_tracing();

    let config_path = FilterConfig::resolve_path()?;
    let config = FilterConfig::load_default().context("loading filter config")?;
    info!(
        path = ?config_path,
        threshold = config.similarity_threshold,
        min_len = config.min_content_length,
        lookback_days = config.lookback_days,
        "filter config loaded"
    );

    let metrics = Metrics::init(config.cache_ttl_secs)?;

    let reducer = VolumeReducer::new(config).context("compiling filter patterns")?;
    let handle = ReducerHandle::new(reducer);
    start_hot_reload_thread(
        handle.clone(),
        config_path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.into()),
    );

    let store = Arc::new(InMemoryArticleStore::new(STORE_CAPACITY));
    let app = api::create_router(AppState::new(handle, store)).merge(metrics.router());

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("parsing BIND_ADDR")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}
