//! # sleephubd: sleephub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars) and initialise logging
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Set up the SleepIQ integration, retrying while the service is unreachable
//! - Spawn the poller and build the axum router
//! - Bind to a TCP port and serve until Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use sleephub_adapter_http_axum::router;
use sleephub_adapter_http_axum::state::AppState;
use sleephub_adapter_sleepiq::{HttpSleepIqClient, SleepIqIntegration};
use sleephub_adapter_storage_memory::{MemoryDeviceRepository, MemoryEntityRepository};
use sleephub_app::polling::run_polling;
use sleephub_app::ports::{Integration, IntegrationContext};
use sleephub_app::services::device_service::DeviceService;
use sleephub_app::services::entity_service::EntityService;
use sleephub_app::services::integration_context::ServiceContext;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    // Repositories & services
    let entity_service = Arc::new(EntityService::new(MemoryEntityRepository::new()));
    let device_service = Arc::new(DeviceService::new(MemoryDeviceRepository::new()));
    let ctx = ServiceContext::new(Arc::clone(&device_service), Arc::clone(&entity_service));

    // SleepIQ
    let client = HttpSleepIqClient::new(config.sleepiq()?)
        .context("failed to build SleepIQ client")?;
    let mut integration = SleepIqIntegration::new(client);
    tokio::select! {
        result = setup_with_retry(&mut integration, &ctx, config.setup_retry()) => result?,
        () = shutdown_signal() => {
            tracing::info!("shutdown requested before setup completed");
            return Ok(());
        }
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = tokio::spawn(run_polling(
        integration,
        ctx,
        config.poll_interval(),
        shutdown_rx,
    ));

    // HTTP
    let state = AppState::from_arcs(entity_service, device_service);
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "sleephubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // The poller exits on its own if the receiver is already gone.
    let _ = shutdown_tx.send(true);
    poller.await.context("polling task panicked")?;
    tracing::info!("sleephubd stopped");
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to `info`");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run `setup` until it succeeds, waiting `retry` after each not-ready failure.
async fn setup_with_retry<I, C>(integration: &mut I, ctx: &C, retry: Duration) -> anyhow::Result<()>
where
    I: Integration,
    C: IntegrationContext,
{
    let name = integration.name();
    loop {
        match integration.setup(ctx).await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_retryable() => {
                tracing::warn!(
                    integration = name,
                    error = %err,
                    retry_secs = retry.as_secs(),
                    "integration not ready, retrying"
                );
                tokio::time::sleep(retry).await;
            }
            Err(err) => {
                return Err(anyhow::Error::new(err).context(format!("{name} setup failed")));
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
