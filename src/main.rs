//! faqmatch HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use faqmatch::bundle::Bundle;
use faqmatch::config::Config;
use faqmatch::engine::{Engine, EngineConfig};
use faqmatch::gateway::create_router;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        confidence_threshold = config.confidence_threshold,
        "faqmatch starting"
    );

    let bundle_dir = config
        .bundle_dir
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("FAQMATCH_BUNDLE_DIR is required"))?;
    let bundle = Bundle::load(bundle_dir)?;

    let engine_config = EngineConfig {
        confidence_threshold: config.confidence_threshold,
        small_talk_cutoff: config.small_talk_cutoff,
    };
    let engine = Arc::new(Engine::with_config(bundle, engine_config));

    let app = create_router(engine);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("faqmatch shutdown complete");
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
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}
