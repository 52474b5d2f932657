//! Entity: the central state-holding concept in sleephub.
//!
//! An entity represents a single observable aspect of a device (e.g. a
//! bed side's occupancy, its current sleep number).

mod attribute_value;
mod state;

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, ValidationError};
use crate::id::{DeviceId, EntityId};
use crate::time::{Timestamp, now};

/// A single observable state holder.
///
/// `entity_id` is the human-readable `<platform>.<object_id>` key
/// (e.g. `binary_sensor.sleepnumber_abc123_left_is_in_bed`) used to match
/// rediscovered entities; `id` is the hub-local identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub device_id: DeviceId,
    pub entity_id: String,
    pub friendly_name: String,
    pub state: EntityState,
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Look up an attribute by key.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Replace the state, bumping `last_updated` and, when the state
    /// actually differs, `last_changed`.
    pub fn update_state(&mut self, state: EntityState, at: Timestamp) {
        if self.state != state {
            self.last_changed = at;
        }
        self.state = state;
        self.last_updated = at;
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] when `entity_id` or `friendly_name`
    /// is empty, or `entity_id` lacks a platform prefix.
    pub fn validate(&self) -> Result<(), HubError> {
        if self.entity_id.is_empty() {
            return Err(ValidationError::EmptyEntityId.into());
        }
        match self.entity_id.split_once('.') {
            Some((platform, object_id)) if !platform.is_empty() && !object_id.is_empty() => {}
            _ => {
                return Err(ValidationError::MalformedEntityId(self.entity_id.clone()).into());
            }
        }
        if self.friendly_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    device_id: Option<DeviceId>,
    entity_id: Option<String>,
    friendly_name: Option<String>,
    state: EntityState,
    attributes: HashMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: HashMap<String, AttributeValue>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if invariants fail.
    pub fn build(self) -> Result<Entity, HubError> {
        let ts = now();
        let entity = Entity {
            id: self.id.unwrap_or_default(),
            device_id: self.device_id.unwrap_or_default(),
            entity_id: self.entity_id.unwrap_or_default(),
            friendly_name: self.friendly_name.unwrap_or_default(),
            state: self.state,
            attributes: self.attributes,
            last_changed: ts,
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn occupancy() -> Entity {
        Entity::builder()
            .entity_id("binary_sensor.bed_left_is_in_bed")
            .friendly_name("Bed Left Is In Bed")
            .state(EntityState::Off)
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_entity_with_attributes() {
        let entity = Entity::builder()
            .entity_id("sensor.bed_left_sleep_number")
            .friendly_name("Bed Left SleepNumber")
            .state(EntityState::On)
            .attribute("sleep_number", AttributeValue::Int(45))
            .build()
            .unwrap();

        assert_eq!(
            entity.get_attribute("sleep_number"),
            Some(&AttributeValue::Int(45))
        );
    }

    #[test]
    fn should_default_state_to_unknown() {
        let entity = Entity::builder()
            .entity_id("sensor.x")
            .friendly_name("X")
            .build()
            .unwrap();
        assert_eq!(entity.state, EntityState::Unknown);
    }

    #[test]
    fn should_reject_empty_entity_id() {
        let result = Entity::builder().friendly_name("X").build();
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::EmptyEntityId))
        ));
    }

    #[test]
    fn should_reject_entity_id_without_platform() {
        let result = Entity::builder()
            .entity_id("no_platform")
            .friendly_name("X")
            .build();
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::MalformedEntityId(_)))
        ));
    }

    #[test]
    fn should_reject_empty_friendly_name() {
        let result = Entity::builder().entity_id("sensor.x").build();
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_bump_last_changed_when_state_differs() {
        let mut entity = occupancy();
        let later = entity.last_changed + TimeDelta::seconds(10);

        entity.update_state(EntityState::On, later);

        assert_eq!(entity.state, EntityState::On);
        assert_eq!(entity.last_changed, later);
        assert_eq!(entity.last_updated, later);
    }

    #[test]
    fn should_keep_last_changed_when_state_is_unchanged() {
        let mut entity = occupancy();
        let changed = entity.last_changed;
        let later = changed + TimeDelta::seconds(10);

        entity.update_state(EntityState::Off, later);

        assert_eq!(entity.last_changed, changed);
        assert_eq!(entity.last_updated, later);
    }
}
