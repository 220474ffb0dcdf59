//! gbcheck HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;

use gbcheck::compliance::ComplianceEngine;
use gbcheck::config::Config;
use gbcheck::gateway::{HandlerState, create_router_with_state};
use gbcheck::registry::McpRegistryClient;
use gbcheck::retrieval::HttpRetrievalClient;
use gbcheck::standards::{DocumentStore, StandardsVerifier, VerificationCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "gbcheck starting"
    );

    let registry = match config.registry_url.as_deref() {
        Some(url) => Some(Arc::new(McpRegistryClient::new(url)?)),
        None => {
            tracing::warn!(
                "no GBCHECK_REGISTRY_URL configured, standards verification will report unknown"
            );
            None
        }
    };

    let retrieval = match (&config.retrieval_url, &config.retrieval_api_key) {
        (Some(url), Some(key)) => Some(Arc::new(HttpRetrievalClient::new(url, key)?)),
        _ => {
            tracing::warn!(
                "no GBCHECK_RETRIEVAL_URL configured, compliance checks will report unknown"
            );
            None
        }
    };

    let cache = VerificationCache::load(&config.cache_path)?;
    let mut verifier = StandardsVerifier::new(registry, cache);
    if let Some(dir) = &config.artifacts_dir {
        tracing::info!(dir = %dir.display(), "standard document capture enabled");
        verifier = verifier.with_documents(DocumentStore::new(dir)?);
    }
    let verifier = Arc::new(verifier);

    let engine = ComplianceEngine::new(
        retrieval,
        config.rules_dataset_ids.clone(),
        config.gb_dataset_ids.clone(),
    );
    engine.ensure_configured()?;
    let engine = Arc::new(engine);

    let state = HandlerState::new(verifier, engine);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gbcheck shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("GBCHECK_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
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
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
