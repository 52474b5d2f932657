//! Integration port: lifecycle and refresh handling for device integrations.
//!
//! An integration bridges an external service (a cloud API, a local bus, …)
//! into the sleephub system. It discovers devices/entities on setup and
//! refreshes their state whenever the host polls it.

use std::future::Future;

use sleephub_domain::device::Device;
use sleephub_domain::entity::Entity;
use sleephub_domain::error::HubError;

/// Context provided to integrations for persisting discoveries.
///
/// This is a **port**. Adapters call it to persist devices and entities
/// they discover or refresh. The concrete implementation is
/// [`ServiceContext`](crate::services::integration_context::ServiceContext),
/// backed by `DeviceService` and `EntityService`.
pub trait IntegrationContext: Send + Sync {
    /// Persist a discovered device (create or update by `integration`+`unique_id`).
    fn upsert_device(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;

    /// Persist a discovered entity (create or update by `entity_id` string).
    fn upsert_entity(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Convenience: persist a full [`DiscoveredDevice`] (device + all entities).
    ///
    /// Entities are re-pointed at the stored device, which keeps its original
    /// id when it was already known.
    fn persist_discovered(
        &self,
        dd: DiscoveredDevice,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        async move {
            let device = self.upsert_device(dd.device).await?;
            for mut entity in dd.entities {
                entity.device_id = device.id;
                self.upsert_entity(entity).await?;
            }
            Ok(())
        }
    }
}

/// A pluggable device integration.
///
/// Implementations live in adapter crates (e.g. `adapter_sleepiq`).
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): connect, fetch initial data, persist discoveries
/// 2. [`poll`](Self::poll): called repeatedly by the host on its own cadence
/// 3. [`teardown`](Self::teardown): clean up resources
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"sleepiq"`).
    fn name(&self) -> &'static str;

    /// Initialise the integration and persist what it discovers via `ctx`.
    ///
    /// Failing here aborts the integration: [`HubError::NotReady`] tells the
    /// host it may retry later, anything else is final.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Refresh every entity owned by this integration and persist the result.
    ///
    /// The default implementation is a no-op (suitable for integrations whose
    /// state never changes after [`setup`](Self::setup)).
    fn poll(
        &mut self,
        _ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        async { Ok(()) }
    }

    /// Called on graceful shutdown. Clean up any connections.
    fn teardown(&mut self) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// A device and its associated entities discovered during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
