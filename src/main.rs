//! peercache node
//!
//! Serves one cache group backed by a demo "slow database" and joins the
//! peers listed in `PEERS`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::{
    api::{create_router, AppState},
    Config, GroupRegistry, HttpPool, Loader, PeerPicker, PoolOptions,
};

/// Stand-in for a slow source of truth.
struct SlowDb {
    rows: HashMap<&'static str, &'static str>,
    latency: Duration,
}

impl SlowDb {
    fn scores() -> Self {
        Self {
            rows: HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]),
            latency: Duration::from_millis(100),
        }
    }
}

#[async_trait]
impl Loader for SlowDb {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        info!(key, "[SlowDB] search key");
        tokio::time::sleep(self.latency).await;
        self.rows
            .get(key)
            .map(|value| value.as_bytes().to_vec())
            .ok_or_else(|| anyhow!("{key} not exist"))
    }
}

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the group and the peer pool
/// 4. Start HTTP server on configured port
/// 5. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting peercache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, group={}, cache_bytes={}, port={}",
        config.self_addr, config.peers, config.group_name, config.cache_bytes, config.server_port
    );

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.new_group(&config.group_name, config.cache_bytes, SlowDb::scores());

    let pool = Arc::new(
        HttpPool::new(&config.self_addr, PoolOptions::from(&config))
            .context("creating peer pool")?,
    );
    pool.set(&config.peers);
    group.register_peers(pool.clone() as Arc<dyn PeerPicker>);

    let app = create_router(AppState::new(registry, pool.base_path()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
