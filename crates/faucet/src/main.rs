//! Faucet service binary.

use clap::Parser;
use drip_chain::HttpRpcClient;
use drip_faucet::api;
use drip_faucet::{ClaimService, CooldownStore, FaucetConfig, MemoryCooldownStore, SledCooldownStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Faucet service CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server bind address
    #[arg(long)]
    server_addr: Option<String>,

    /// RPC URL of the blockchain node
    #[arg(long)]
    rpc_url: Option<String>,

    /// Faucet account private key (hex)
    #[arg(long)]
    private_key: Option<String>,

    /// Cooldown between claims per address (seconds)
    #[arg(long)]
    cooldown: Option<u64>,

    /// Cooldown store path (omit for in-memory)
    #[arg(long)]
    db_path: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = if args.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting drip faucet v{}", env!("CARGO_PKG_VERSION"));

    let mut config = FaucetConfig::from_env();

    if let Some(addr) = args.server_addr {
        config.server_addr = addr;
    }
    if let Some(rpc_url) = args.rpc_url {
        config.rpc_url = rpc_url;
    }
    if let Some(key) = args.private_key {
        config.private_key = key;
    }
    if let Some(cooldown) = args.cooldown {
        config.cooldown_secs = cooldown;
    }
    if let Some(db_path) = args.db_path {
        config.db_path = Some(db_path);
    }

    config.validate()?;

    info!("Configuration:");
    info!("  Server address: {}", config.server_addr);
    info!("  RPC URL: {}", config.rpc_url);
    info!("  Cooldown: {}s", config.cooldown_secs);
    info!("  Gas limit: {}", config.gas_limit);
    info!("  Max claim: {} wei", config.max_claim_amount);

    let chain = Arc::new(HttpRpcClient::new(
        config.rpc_url.clone(),
        config.receipt_poll_interval(),
        config.confirmation_timeout(),
    ));

    let store: Arc<dyn CooldownStore> = match &config.db_path {
        Some(path) => {
            let store = SledCooldownStore::open(path, config.cooldown_duration())?;
            info!("Cooldown store: sled at {}", path);
            Arc::new(store)
        }
        None => {
            info!("Cooldown store: in-memory");
            Arc::new(MemoryCooldownStore::new(config.cooldown_duration()))
        }
    };

    let service = Arc::new(ClaimService::new(config.clone(), chain, store)?);

    match service.status().await {
        Ok(status) => info!("Faucet balance: {} ETH", status.balance_ether),
        Err(e) => warn!("Could not fetch faucet balance: {}", e),
    }

    let mut app = api::router(service).layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
        info!("CORS enabled");
    }

    let addr: SocketAddr = config.server_addr.parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
