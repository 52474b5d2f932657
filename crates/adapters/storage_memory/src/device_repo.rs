//! In-memory implementation of [`DeviceRepository`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use sleephub_app::ports::DeviceRepository;
use sleephub_domain::device::Device;
use sleephub_domain::error::HubError;
use sleephub_domain::id::DeviceId;

use crate::error::StorageError;

/// Device repository backed by a `HashMap` behind an [`RwLock`].
#[derive(Debug, Default)]
pub struct MemoryDeviceRepository {
    store: RwLock<HashMap<DeviceId, Device>>,
}

impl MemoryDeviceRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<DeviceId, Device>>, StorageError> {
        self.store
            .read()
            .map_err(|_| StorageError::Poisoned { store: "device" })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<DeviceId, Device>>, StorageError> {
        self.store
            .write()
            .map_err(|_| StorageError::Poisoned { store: "device" })
    }
}

impl DeviceRepository for MemoryDeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send {
        let result = self.write().map(|mut store| {
            store.insert(device.id, device.clone());
            device
        });
        async move { Ok(result?) }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send {
        let result = self.read().map(|store| store.get(&id).cloned());
        async move { Ok(result?) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        let result = self.read().map(|store| {
            let mut all: Vec<Device> = store.values().cloned().collect();
            all.sort_by(|a, b| a.name.cmp(&b.name));
            all
        });
        async move { Ok(result?) }
    }

    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send {
        let result = self.read().map(|store| {
            store
                .values()
                .find(|d| d.integration == integration && d.unique_id == unique_id)
                .cloned()
        });
        async move { Ok(result?) }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send {
        let result = self.write().map(|mut store| {
            store.insert(device.id, device.clone());
            device
        });
        async move { Ok(result?) }
    }
}
