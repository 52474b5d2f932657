//! In-memory implementation of [`EntityRepository`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use sleephub_app::ports::EntityRepository;
use sleephub_domain::entity::Entity;
use sleephub_domain::error::HubError;
use sleephub_domain::id::{DeviceId, EntityId};

use crate::error::StorageError;

/// Entity repository backed by a `HashMap` behind an [`RwLock`].
#[derive(Debug, Default)]
pub struct MemoryEntityRepository {
    store: RwLock<HashMap<EntityId, Entity>>,
}

impl MemoryEntityRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<EntityId, Entity>>, StorageError> {
        self.store
            .read()
            .map_err(|_| StorageError::Poisoned { store: "entity" })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<EntityId, Entity>>, StorageError> {
        self.store
            .write()
            .map_err(|_| StorageError::Poisoned { store: "entity" })
    }
}

impl EntityRepository for MemoryEntityRepository {
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send {
        let result = self.write().map(|mut store| {
            store.insert(entity.id, entity.clone());
            entity
        });
        async move { Ok(result?) }
    }

    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send {
        let result = self.read().map(|store| store.get(&id).cloned());
        async move { Ok(result?) }
    }

    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send {
        let result = self.read().map(|store| {
            store
                .values()
                .find(|ent| ent.entity_id == entity_id)
                .cloned()
        });
        async move { Ok(result?) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send {
        let result = self.read().map(|store| {
            let mut all: Vec<Entity> = store.values().cloned().collect();
            all.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
            all
        });
        async move { Ok(result?) }
    }

    fn find_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send {
        let result = self.read().map(|store| {
            let mut found: Vec<Entity> = store
                .values()
                .filter(|ent| ent.device_id == device_id)
                .cloned()
                .collect();
            found.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
            found
        });
        async move { Ok(result?) }
    }

    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send {
        let result = self.write().map(|mut store| {
            store.insert(entity.id, entity.clone());
            entity
        });
        async move { Ok(result?) }
    }
}
