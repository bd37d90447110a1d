//! Xlgate Server - Main entry point

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use xlgate_common::logging::{init_logging, LogConfig};

use xlgate_server::{
    api::{self, AppState},
    config::Config,
    notify::{LogTransport, NotificationDispatcher, NotificationTransport, WebhookTransport},
    orchestrator::IngestionOrchestrator,
    pipeline::{NoopTransform, TaskChain},
    validate::ValidationChain,
    workbook::OoxmlWorkbookParser,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; real environment variables take precedence
    dotenvy::dotenv().ok();

    // Initialize logging with configuration from environment
    let log_config = LogConfig::from_env().unwrap_or_else(|_| {
        LogConfig::new()
            .with_file_prefix("xlgate-server")
            .with_filter_directives("xlgate_server=debug,tower_http=debug")
    });
    init_logging(&log_config)?;

    info!("Starting Xlgate Server");

    // Configuration faults are the only fatal failure class, and only here.
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Pick the notification transport
    let transport: Arc<dyn NotificationTransport> = match config.notify.webhook_url {
        Some(ref url) => {
            info!(url = %url, "Using webhook notification transport");
            Arc::new(WebhookTransport::new(url.clone()))
        },
        None => {
            info!("No webhook configured, using log notification transport");
            Arc::new(LogTransport)
        },
    };
    let dispatcher = Arc::new(NotificationDispatcher::new(transport));

    // Wire the core: validation chain, task chain, orchestrator
    let parser = Arc::new(OoxmlWorkbookParser::new());
    let orchestrator = Arc::new(IngestionOrchestrator::new(
        ValidationChain::new(&config.ingest, parser),
        TaskChain::new(
            Arc::new(NoopTransform),
            Arc::clone(&dispatcher),
            config.notify.subject.clone(),
        ),
        dispatcher,
        config.notify.clone(),
    ));

    let state = AppState {
        orchestrator,
        system_identity: config.notify.system_identity.clone(),
    };
    let app = api::router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Wait for a shutdown signal (ctrl-c or SIGTERM)
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install ctrl-c handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(
        "Shutdown signal received, draining for up to {}s",
        timeout_secs
    );
}
