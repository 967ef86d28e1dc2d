use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use registry_trigger::callback::HttpCallbackDispatcher;
use registry_trigger::config::{Cli, LogFormat, load_jobs};
use registry_trigger::coordinator::Coordinator;
use registry_trigger::host::InMemoryHost;
use registry_trigger::server::{AppState, build_router};
use registry_trigger::store::CorrelationStore;

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "registry_trigger=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let tokens = cli.api_tokens()?;
    let jobs = match &cli.jobs {
        Some(path) => load_jobs(path)?,
        None => Vec::new(),
    };
    info!(jobs = jobs.len(), state_dir = %cli.state_dir.display(), "Starting registry trigger");

    std::fs::create_dir_all(&cli.state_dir)
        .with_context(|| format!("creating state directory {}", cli.state_dir.display()))?;

    let host = Arc::new(InMemoryHost::new(jobs));
    let store = Arc::new(CorrelationStore::new(&cli.state_dir));
    let coordinator = Arc::new(Coordinator::new(
        store,
        host.clone(),
        HttpCallbackDispatcher::default(),
        cli.callback_settings(),
    ));
    let app = build_router(AppState::new(host, coordinator, tokens, cli.debug));

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("binding {}", cli.listen))?;
    info!("listening on {}", cli.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
