//! Storage port: repository traits for entities and devices.

use std::future::Future;

use sleephub_domain::device::Device;
use sleephub_domain::entity::Entity;
use sleephub_domain::error::HubError;
use sleephub_domain::id::{DeviceId, EntityId};

/// Persistence for [`Entity`] records.
pub trait EntityRepository {
    /// Insert a new entity.
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Fetch an entity by hub id.
    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send;

    /// Fetch an entity by its `<platform>.<object_id>` key.
    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send;

    /// List every entity.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send;

    /// List the entities attached to a device.
    fn find_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send;

    /// Replace an existing entity.
    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send;
}

/// Persistence for [`Device`] records.
pub trait DeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send;

    /// Fetch a device by the identity its integration assigned to it.
    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send;

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;
}
