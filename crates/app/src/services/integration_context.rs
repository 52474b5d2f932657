//! Concrete [`IntegrationContext`] backed by application services.

use std::sync::Arc;

use sleephub_domain::device::Device;
use sleephub_domain::entity::Entity;
use sleephub_domain::error::HubError;

use crate::ports::{DeviceRepository, EntityRepository, IntegrationContext};
use crate::services::device_service::DeviceService;
use crate::services::entity_service::EntityService;

/// [`IntegrationContext`] implementation that delegates to `DeviceService`
/// and `EntityService`.
///
/// Wraps `Arc`-ed services so it is cheaply cloneable and `Send + Sync`.
/// The generic parameters are confined to this struct; integrations see
/// only the [`IntegrationContext`] trait.
pub struct ServiceContext<DR, ER> {
    device_service: Arc<DeviceService<DR>>,
    entity_service: Arc<EntityService<ER>>,
}

impl<DR, ER> ServiceContext<DR, ER> {
    /// Create a new context backed by the given services.
    pub fn new(device_service: Arc<DeviceService<DR>>, entity_service: Arc<EntityService<ER>>) -> Self {
        Self {
            device_service,
            entity_service,
        }
    }
}

impl<DR, ER> Clone for ServiceContext<DR, ER> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            entity_service: Arc::clone(&self.entity_service),
        }
    }
}

impl<DR, ER> IntegrationContext for ServiceContext<DR, ER>
where
    DR: DeviceRepository + Send + Sync + 'static,
    ER: EntityRepository + Send + Sync + 'static,
{
    async fn upsert_device(&self, device: Device) -> Result<Device, HubError> {
        self.device_service.upsert_device(device).await
    }

    async fn upsert_entity(&self, entity: Entity) -> Result<Entity, HubError> {
        self.entity_service.upsert_entity(entity).await
    }
}
