//! Entity service: use-cases for managing entities.

use sleephub_domain::entity::Entity;
use sleephub_domain::error::{HubError, NotFoundError};
use sleephub_domain::id::{DeviceId, EntityId};
use sleephub_domain::time::now;

use crate::ports::EntityRepository;

/// Application service for entity storage and state management.
pub struct EntityService<R> {
    repo: R,
}

impl<R: EntityRepository> EntityService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new entity after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    pub async fn create_entity(&self, mut entity: Entity) -> Result<Entity, HubError> {
        entity.validate()?;
        let ts = now();
        entity.last_updated = ts;
        entity.last_changed = ts;
        self.repo.create(entity).await
    }

    /// Create or refresh an entity by its `entity_id` key.
    ///
    /// An existing entity keeps its hub id; its `last_changed` only moves
    /// when the state differs from the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    pub async fn upsert_entity(&self, entity: Entity) -> Result<Entity, HubError> {
        entity.validate()?;
        let Some(existing) = self.repo.find_by_entity_id(&entity.entity_id).await? else {
            tracing::debug!("registering new entity");
            return self.create_entity(entity).await;
        };

        let mut updated = Entity {
            id: existing.id,
            state: existing.state,
            last_changed: existing.last_changed,
            last_updated: existing.last_updated,
            ..entity.clone()
        };
        updated.update_state(entity.state, now());
        self.repo.update(updated).await
    }

    /// Look up an entity by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when no entity with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_entity(&self, id: EntityId) -> Result<Entity, HubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all entities.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_entities(&self) -> Result<Vec<Entity>, HubError> {
        self.repo.get_all().await
    }

    /// List the entities exposed by one device.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_device_entities(&self, device_id: DeviceId) -> Result<Vec<Entity>, HubError> {
        self.repo.find_by_device_id(device_id).await
    }
}
