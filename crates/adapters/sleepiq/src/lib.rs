//! # sleephub-adapter-sleepiq
//!
//! SleepIQ integration: polls the Sleep Number cloud for every bed on an
//! account and exposes each occupied side as two entities.
//!
//! ## Provided entities
//!
//! | Platform | Entity ID | Value |
//! |----------|-----------|-------|
//! | `sensor` | `sensor.sleepnumber_<bed>_<side>_sleep_number` | `sleep_number` attribute |
//! | `binary_sensor` | `binary_sensor.sleepnumber_<bed>_<side>_is_in_bed` | `on` when occupied |
//!
//! Every entity also carries `bed_info`, `alerts`, `sleeper` and
//! `assumed_state` attributes.
//!
//! ## How it works
//!
//! All sensors share one [`SleepIqData`] cache. Refreshing a sensor
//! refreshes the cache, which fetches from the API at most once per
//! [`MIN_TIME_BETWEEN_UPDATES`]; the remaining sensors of the same poll
//! cycle read the cached snapshot.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `sleephub-app` and `sleephub-domain`.

mod client;
mod config;
mod data;
mod error;
mod http;
mod model;
mod sensor;

pub use client::{ClientError, ClientOutput, SleepIqClient};
pub use config::SleepIqConfig;
pub use data::{MIN_TIME_BETWEEN_UPDATES, SleepIqData};
pub use error::SleepIqError;
pub use http::{DEFAULT_BASE_URL, HttpSleepIqClient};
pub use model::{BedSnapshot, Side, SideSnapshot, Sleeper};
pub use sensor::{SensorKind, SharedData, SleepIqSensor};

use std::sync::Arc;

use tokio::sync::Mutex;

use sleephub_app::ports::{DiscoveredDevice, Integration, IntegrationContext};
use sleephub_domain::error::HubError;
use sleephub_domain::time::{Clock, SystemClock};

/// Integration name, also used as the device `integration` field.
pub const DOMAIN: &str = "sleepiq";

/// Manufacturer reported on every bed device.
pub const MANUFACTURER: &str = "Sleep Number";

/// SleepIQ integration owning the shared cache and its sensors.
pub struct SleepIqIntegration<C, K = SystemClock> {
    data: SharedData<C, K>,
    sensors: Vec<SleepIqSensor<C, K>>,
}

impl<C: SleepIqClient> SleepIqIntegration<C> {
    /// Create the integration around `client`.
    pub fn new(client: C) -> Self {
        Self::from_data(SleepIqData::new(client))
    }
}

impl<C: SleepIqClient, K: Clock> SleepIqIntegration<C, K> {
    /// Create the integration around a pre-built cache.
    pub fn from_data(data: SleepIqData<C, K>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            sensors: Vec::new(),
        }
    }

    /// Sensors registered by the last successful setup.
    #[must_use]
    pub fn sensors(&self) -> &[SleepIqSensor<C, K>] {
        &self.sensors
    }

    /// Persist every sensor, grouped under its bed's device.
    async fn persist(&self, ctx: &impl IntegrationContext) -> Result<(), HubError> {
        for group in self.sensors.chunk_by(|a, b| a.bed_id() == b.bed_id()) {
            let Some(first) = group.first() else {
                continue;
            };
            let device = first.to_device()?;
            let entities = group
                .iter()
                .map(|sensor| sensor.to_entity(device.id))
                .collect::<Result<Vec<_>, _>>()?;
            ctx.persist_discovered(DiscoveredDevice { device, entities })
                .await?;
        }
        Ok(())
    }
}

impl<C: SleepIqClient, K: Clock> Integration for SleepIqIntegration<C, K> {
    fn name(&self) -> &'static str {
        DOMAIN
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), HubError> {
        let mut beds: Vec<BedSnapshot> = {
            let mut data = self.data.lock().await;
            data.force_update().await?;
            data.beds().values().cloned().collect()
        };
        beds.sort_by(|a, b| a.bed_id.cmp(&b.bed_id));

        let mut sensors = Vec::new();
        for bed in &beds {
            for side in bed.occupied_sides() {
                for kind in SensorKind::ALL {
                    sensors.push(SleepIqSensor::new(
                        Arc::clone(&self.data),
                        bed.bed_id.as_str(),
                        side,
                        kind,
                    ));
                }
            }
        }
        for sensor in &mut sensors {
            sensor.update().await?;
        }
        self.sensors = sensors;
        self.persist(ctx).await?;

        tracing::info!(
            beds = beds.len(),
            sensors = self.sensors.len(),
            "SleepIQ setup complete"
        );
        Ok(())
    }

    async fn poll(&mut self, ctx: &impl IntegrationContext) -> Result<(), HubError> {
        for sensor in &mut self.sensors {
            if let Err(err) = sensor.update().await {
                tracing::error!(
                    unique_id = sensor.unique_id(),
                    error = %err,
                    "SleepIQ sensor update failed"
                );
            }
        }
        self.persist(ctx).await
    }

    async fn teardown(&mut self) -> Result<(), HubError> {
        self.sensors.clear();
        tracing::debug!("SleepIQ sensors released");
        Ok(())
    }
}
