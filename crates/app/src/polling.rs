//! Host-side polling loop.
//!
//! Integrations do not schedule themselves: the host calls
//! [`Integration::poll`] on a fixed cadence until it is told to stop, then
//! tears the integration down.

use std::time::Duration;

use tokio::sync::watch;

use crate::ports::{Integration, IntegrationContext};

/// Poll `integration` every `interval` until `shutdown` flips to `true`
/// (or its sender is dropped), then call [`Integration::teardown`].
///
/// The first poll happens one `interval` after the call, since
/// [`Integration::setup`] already fetched the initial state. A failed poll
/// is logged and retried on the next tick.
pub async fn run_polling<I, C>(
    mut integration: I,
    ctx: C,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    I: Integration + Send,
    C: IntegrationContext,
{
    let name = integration.name();
    tracing::info!(
        integration = name,
        interval_secs = interval.as_secs(),
        "polling started"
    );

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            () = tokio::time::sleep(interval) => {}
        }

        if let Err(err) = integration.poll(&ctx).await {
            tracing::warn!(integration = name, %err, "poll failed, retrying next interval");
        }
    }

    if let Err(err) = integration.teardown().await {
        tracing::warn!(integration = name, %err, "teardown failed");
    }
    tracing::info!(integration = name, "polling stopped");
}
