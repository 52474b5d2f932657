//! Device service: use-cases for managing devices.

use sleephub_domain::device::Device;
use sleephub_domain::error::{HubError, NotFoundError};
use sleephub_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// Application service for registering and reading devices.
pub struct DeviceService<R> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new device after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    pub async fn create_device(&self, device: Device) -> Result<Device, HubError> {
        device.validate()?;
        self.repo.create(device).await
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, HubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<Vec<Device>, HubError> {
        self.repo.get_all().await
    }

    /// Update an existing device.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, device))]
    pub async fn update_device(&self, device: Device) -> Result<Device, HubError> {
        device.validate()?;
        self.repo.update(device).await
    }

    /// Register `device`, or refresh the one already known under the same
    /// `(integration, unique_id)` pair while keeping its id.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, device), fields(unique_id = %device.unique_id))]
    pub async fn upsert_device(&self, device: Device) -> Result<Device, HubError> {
        let existing = self
            .repo
            .find_by_integration_unique_id(&device.integration, &device.unique_id)
            .await?;
        match existing {
            Some(existing) => {
                self.update_device(Device {
                    id: existing.id,
                    ..device
                })
                .await
            }
            None => {
                tracing::debug!("registering new device");
                self.create_device(device).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleephub_domain::error::ValidationError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecDeviceRepo {
        devices: Mutex<Vec<Device>>,
    }

    impl VecDeviceRepo {
        fn save(&self, device: &Device) {
            let mut devices = self.devices.lock().unwrap();
            devices.retain(|d| d.id != device.id);
            devices.push(device.clone());
        }
    }

    impl DeviceRepository for VecDeviceRepo {
        async fn create(&self, device: Device) -> Result<Device, HubError> {
            self.save(&device);
            Ok(device)
        }

        async fn get_by_id(&self, id: DeviceId) -> Result<Option<Device>, HubError> {
            Ok(self.devices.lock().unwrap().iter().find(|d| d.id == id).cloned())
        }

        async fn get_all(&self) -> Result<Vec<Device>, HubError> {
            Ok(self.devices.lock().unwrap().clone())
        }

        async fn find_by_integration_unique_id(
            &self,
            integration: &str,
            unique_id: &str,
        ) -> Result<Option<Device>, HubError> {
            Ok(self
                .devices
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.integration == integration && d.unique_id == unique_id)
                .cloned())
        }

        async fn update(&self, device: Device) -> Result<Device, HubError> {
            self.save(&device);
            Ok(device)
        }
    }

    fn bed(name: &str, integration: &str, bed_id: &str) -> Device {
        Device::builder()
            .name(name)
            .integration(integration)
            .unique_id(bed_id)
            .build()
            .unwrap()
    }

    fn service() -> DeviceService<VecDeviceRepo> {
        DeviceService::new(VecDeviceRepo::default())
    }

    #[tokio::test]
    async fn should_create_and_get_device() {
        let svc = service();
        let device = bed("Sleep Number Master", "sleepiq", "abc123");
        let id = device.id;

        svc.create_device(device).await.unwrap();

        let fetched = svc.get_device(id).await.unwrap();
        assert_eq!(fetched.name, "Sleep Number Master");
        assert_eq!(svc.list_devices().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_device_without_name() {
        let svc = service();
        let mut device = bed("Sleep Number Master", "sleepiq", "abc123");
        device.name.clear();

        let result = svc.create_device(device).await;

        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_device() {
        let result = service().get_device(DeviceId::new()).await;

        assert!(matches!(result, Err(HubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_keep_id_when_upserting_known_bed() {
        let svc = service();
        let first = svc
            .upsert_device(bed("Sleep Number Master", "sleepiq", "abc123"))
            .await
            .unwrap();

        let mut renamed = bed("Sleep Number Guest", "sleepiq", "abc123");
        renamed.model = Some("P5".to_string());
        let second = svc.upsert_device(renamed).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Sleep Number Guest");
        assert_eq!(second.model.as_deref(), Some("P5"));
        assert_eq!(svc.list_devices().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_scope_upsert_to_the_integration() {
        let svc = service();
        let sleepiq = svc
            .upsert_device(bed("Bed", "sleepiq", "abc123"))
            .await
            .unwrap();

        let other = svc.upsert_device(bed("Bed", "demo", "abc123")).await.unwrap();

        assert_ne!(other.id, sleepiq.id);
        assert_eq!(svc.list_devices().await.unwrap().len(), 2);
    }
}
