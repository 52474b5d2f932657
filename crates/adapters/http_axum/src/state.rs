//! Shared application state for axum handlers.

use std::sync::Arc;

use sleephub_app::ports::{DeviceRepository, EntityRepository};
use sleephub_app::services::device_service::DeviceService;
use sleephub_app::services::entity_service::EntityService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository types to avoid dynamic dispatch. `Clone` is
/// implemented manually so the repositories themselves do not need to be
/// `Clone`, only the `Arc` wrappers are cloned.
pub struct AppState<ER, DR> {
    /// Entity lookups.
    pub entity_service: Arc<EntityService<ER>>,
    /// Device lookups.
    pub device_service: Arc<DeviceService<DR>>,
}

impl<ER, DR> Clone for AppState<ER, DR> {
    fn clone(&self) -> Self {
        Self {
            entity_service: Arc::clone(&self.entity_service),
            device_service: Arc::clone(&self.device_service),
        }
    }
}

impl<ER, DR> AppState<ER, DR>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when the services are also shared with the polling task.
    pub fn from_arcs(
        entity_service: Arc<EntityService<ER>>,
        device_service: Arc<DeviceService<DR>>,
    ) -> Self {
        Self {
            entity_service,
            device_service,
        }
    }
}
