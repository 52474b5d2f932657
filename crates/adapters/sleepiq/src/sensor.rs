//! Per-side sensor facades over the shared SleepIQ cache.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use sleephub_domain::device::Device;
use sleephub_domain::entity::{AttributeValue, Entity, EntityState};
use sleephub_domain::error::HubError;
use sleephub_domain::id::DeviceId;
use sleephub_domain::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::client::SleepIqClient;
use crate::data::SleepIqData;
use crate::error::SleepIqError;
use crate::model::{BedSnapshot, Side, SideSnapshot};
use crate::{DOMAIN, MANUFACTURER};

/// Cache handle shared by every sensor of one account.
pub type SharedData<C, K = SystemClock> = Arc<Mutex<SleepIqData<C, K>>>;

/// What a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// The side's current sleep number setting.
    SleepNumber,
    /// Whether someone is lying on the side.
    IsInBed,
}

impl SensorKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 2] = [Self::SleepNumber, Self::IsInBed];

    /// Stable key used in identifiers and as the value attribute name.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::SleepNumber => "sleep_number",
            Self::IsInBed => "is_in_bed",
        }
    }

    /// Human-readable suffix of the display name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SleepNumber => "SleepNumber",
            Self::IsInBed => "Is In Bed",
        }
    }

    /// Entity platform the kind registers under.
    #[must_use]
    pub fn platform(self) -> &'static str {
        match self {
            Self::SleepNumber => "sensor",
            Self::IsInBed => "binary_sensor",
        }
    }
}

/// One measurement of one side of one bed.
///
/// Starts unresolved and unavailable; [`update`](Self::update) refreshes the
/// shared cache (subject to its throttle) and re-reads this sensor's slice.
pub struct SleepIqSensor<C, K = SystemClock> {
    data: SharedData<C, K>,
    bed_id: String,
    side: Side,
    kind: SensorKind,
    unique_id: String,
    bed: Option<BedSnapshot>,
    available: bool,
    attributes: HashMap<String, AttributeValue>,
}

impl<C: SleepIqClient, K: Clock> SleepIqSensor<C, K> {
    /// Create a sensor for `side` of `bed_id`.
    pub fn new(data: SharedData<C, K>, bed_id: impl Into<String>, side: Side, kind: SensorKind) -> Self {
        let bed_id = bed_id.into();
        let unique_id = format!("Sleep Number {bed_id} {side} {}", kind.key());
        Self {
            data,
            bed_id,
            side,
            kind,
            unique_id,
            bed: None,
            available: false,
            attributes: HashMap::new(),
        }
    }

    /// Refresh the shared cache and re-read this sensor's side.
    ///
    /// A connectivity failure marks the sensor unavailable and keeps the
    /// previous readings.
    ///
    /// # Errors
    ///
    /// Returns any [`SleepIqError`] other than [`SleepIqError::Connection`].
    pub async fn update(&mut self) -> Result<(), SleepIqError> {
        let mut data = self.data.lock().await;
        match data.update().await {
            Ok(()) => {}
            Err(SleepIqError::Connection(err)) => {
                tracing::debug!(
                    unique_id = %self.unique_id,
                    error = %err,
                    "SleepIQ unreachable, keeping last readings"
                );
                self.available = false;
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        self.available = true;
        self.bed = data.bed(&self.bed_id).cloned();
        drop(data);

        let Some(bed) = self.bed.as_ref() else {
            tracing::debug!(unique_id = %self.unique_id, "bed no longer on the account");
            return Ok(());
        };
        let Some(side) = bed.side(self.side) else {
            tracing::debug!(unique_id = %self.unique_id, "side no longer assigned");
            return Ok(());
        };

        let bed_info = self.bed_info(bed);
        let alerts = json!({
            "alert_id": side.alert_id,
            "message": side.alert_detailed_message,
        });
        let sleeper = side.sleeper.first_name.clone();
        self.attributes.insert("bed_info".to_string(), AttributeValue::Json(bed_info));
        self.attributes.insert("alerts".to_string(), AttributeValue::Json(alerts));
        self.attributes.insert("sleeper".to_string(), AttributeValue::String(sleeper));
        Ok(())
    }
}

impl<C, K> SleepIqSensor<C, K> {
    /// Identifier fixed at construction, e.g. `Sleep Number abc123 left sleep_number`.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    #[must_use]
    pub fn bed_id(&self) -> &str {
        &self.bed_id
    }

    /// Display name, or the unique id while the bed or side is unresolved.
    #[must_use]
    pub fn name(&self) -> String {
        match self.resolved() {
            Some((bed, side)) => format!(
                "Sleep Number {} {} {}",
                bed.name,
                side.sleeper.first_name,
                self.kind.label()
            ),
            None => self.unique_id.clone(),
        }
    }

    /// Whether the last refresh reached the service.
    #[must_use]
    pub fn available(&self) -> bool {
        self.available
    }

    /// Whether the readings are stale.
    #[must_use]
    pub fn assumed_state(&self) -> bool {
        !self.available
    }

    /// Last known `bed_info`, `alerts` and `sleeper` attributes.
    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, AttributeValue> {
        &self.attributes
    }

    /// `<platform>.sleepnumber_<bed>_<side>_<kind>`.
    #[must_use]
    pub fn entity_id(&self) -> String {
        format!(
            "{}.sleepnumber_{}_{}_{}",
            self.kind.platform(),
            slugify(&self.bed_id),
            self.side,
            self.kind.key()
        )
    }

    /// Project the sensor into a hub entity attached to `device_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the projection violates entity
    /// invariants.
    pub fn to_entity(&self, device_id: DeviceId) -> Result<Entity, HubError> {
        let side = self.resolved().map(|(_, side)| side);
        let state = match (self.available, self.kind, side) {
            (false, _, _) => EntityState::Unavailable,
            (true, _, None) => EntityState::Unknown,
            (true, SensorKind::IsInBed, Some(side)) => EntityState::from(side.is_in_bed),
            (true, SensorKind::SleepNumber, Some(_)) => EntityState::On,
        };

        let mut builder = Entity::builder()
            .device_id(device_id)
            .entity_id(self.entity_id())
            .friendly_name(self.name())
            .state(state)
            .attributes(self.attributes.clone())
            .attribute("assumed_state", AttributeValue::Bool(self.assumed_state()));

        builder = match self.kind {
            SensorKind::SleepNumber => builder.attribute("icon", AttributeValue::from("mdi:bed")),
            SensorKind::IsInBed => builder.attribute("device_class", AttributeValue::from("occupancy")),
        };
        if let Some(side) = side {
            let value = match self.kind {
                SensorKind::SleepNumber => AttributeValue::Int(side.sleep_number),
                SensorKind::IsInBed => AttributeValue::Bool(side.is_in_bed),
            };
            builder = builder.attribute(self.kind.key(), value);
        }
        builder.build()
    }

    /// The bed this sensor belongs to, as a hub device.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the projection violates device
    /// invariants.
    pub fn to_device(&self) -> Result<Device, HubError> {
        let mut builder = Device::builder()
            .manufacturer(MANUFACTURER)
            .integration(DOMAIN)
            .unique_id(self.bed_id.as_str());
        builder = match self.bed.as_ref() {
            Some(bed) => builder
                .name(format!("{MANUFACTURER} {}", bed.name))
                .model(bed.model.as_str()),
            None => builder.name(format!("{MANUFACTURER} {}", self.bed_id)),
        };
        builder.build()
    }

    fn resolved(&self) -> Option<(&BedSnapshot, &SideSnapshot)> {
        let bed = self.bed.as_ref()?;
        bed.side(self.side).map(|side| (bed, side))
    }

    fn bed_info(&self, bed: &BedSnapshot) -> serde_json::Value {
        json!({
            "identifiers": [[DOMAIN, self.unique_id]],
            "name": bed.name,
            "bed_id": self.bed_id,
            "mac_address": bed.mac_address,
            "model": bed.model,
            "sku": bed.sku,
            "generation": bed.generation,
            "purchase_date": bed.purchase_date,
            "registration_date": bed.registration_date,
            "size": bed.size,
            "side": self.side.as_str(),
        })
    }
}

fn slugify(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::data::testing::{ManualClock, ScriptedClient};
    use crate::model::fixtures;

    type TestData = SharedData<ScriptedClient, ManualClock>;

    fn shared(client: ScriptedClient) -> (TestData, ManualClock) {
        let clock = ManualClock::default();
        let data = SleepIqData::with_clock(client, clock.clone());
        (Arc::new(Mutex::new(data)), clock)
    }

    fn sensor(data: &TestData, kind: SensorKind) -> SleepIqSensor<ScriptedClient, ManualClock> {
        SleepIqSensor::new(Arc::clone(data), "abc123", Side::Left, kind)
    }

    #[test]
    fn should_build_unique_id_from_bed_side_and_kind() {
        let (data, _clock) = shared(ScriptedClient::default());
        let sensor = sensor(&data, SensorKind::SleepNumber);
        assert_eq!(sensor.unique_id(), "Sleep Number abc123 left sleep_number");
    }

    #[test]
    fn should_start_unavailable_and_named_by_unique_id() {
        let (data, _clock) = shared(ScriptedClient::default());
        let sensor = sensor(&data, SensorKind::IsInBed);
        assert!(!sensor.available());
        assert!(sensor.assumed_state());
        assert_eq!(sensor.name(), "Sleep Number abc123 left is_in_bed");
        assert!(sensor.attributes().is_empty());
    }

    #[tokio::test]
    async fn should_populate_attributes_after_successful_update() {
        let (data, _clock) = shared(ScriptedClient::returning(vec![fixtures::bed("abc123")]));
        let mut sensor = sensor(&data, SensorKind::SleepNumber);

        sensor.update().await.unwrap();

        assert!(sensor.available());
        assert!(!sensor.assumed_state());
        assert_eq!(sensor.name(), "Sleep Number Master Sam SleepNumber");
        assert_eq!(
            sensor.attributes().get("sleeper"),
            Some(&AttributeValue::String("Sam".to_string()))
        );
        assert_eq!(
            sensor.attributes().get("alerts"),
            Some(&AttributeValue::Json(json!({"alert_id": 0, "message": "No Alert"})))
        );
        let Some(AttributeValue::Json(bed_info)) = sensor.attributes().get("bed_info") else {
            panic!("bed_info missing");
        };
        assert_eq!(bed_info["bed_id"], "abc123");
        assert_eq!(bed_info["side"], "left");
        assert_eq!(bed_info["model"], "P5");
        assert_eq!(
            bed_info["identifiers"],
            json!([["sleepiq", "Sleep Number abc123 left sleep_number"]])
        );
    }

    #[tokio::test]
    async fn should_share_one_fetch_between_sensors() {
        let (data, _clock) = shared(ScriptedClient::returning(vec![fixtures::bed("abc123")]));
        let mut number = sensor(&data, SensorKind::SleepNumber);
        let mut in_bed = sensor(&data, SensorKind::IsInBed);

        number.update().await.unwrap();
        in_bed.update().await.unwrap();

        assert_eq!(data.lock().await.client().fetches, 1);
        assert_eq!(in_bed.name(), "Sleep Number Master Sam Is In Bed");
    }

    #[tokio::test]
    async fn should_keep_attributes_when_connection_fails() {
        let mut client = ScriptedClient::returning(vec![fixtures::bed("abc123")]);
        client
            .responses
            .push_back(Err(ClientError::Connection("connection refused".into())));
        let (data, clock) = shared(client);
        let mut sensor = sensor(&data, SensorKind::SleepNumber);

        sensor.update().await.unwrap();
        let before = sensor.attributes().clone();
        clock.advance(31);
        sensor.update().await.unwrap();

        assert!(!sensor.available());
        assert!(sensor.assumed_state());
        assert_eq!(sensor.attributes(), &before);
        assert_eq!(sensor.name(), "Sleep Number Master Sam SleepNumber");
    }

    #[tokio::test]
    async fn should_recover_availability_after_reconnect() {
        let mut client = ScriptedClient::default();
        client
            .responses
            .push_back(Err(ClientError::MalformedResponse("missing bedId".into())));
        client.responses.push_back(Ok(vec![fixtures::bed("abc123")]));
        let (data, _clock) = shared(client);
        let mut sensor = sensor(&data, SensorKind::IsInBed);

        sensor.update().await.unwrap();
        assert!(!sensor.available());
        sensor.update().await.unwrap();

        assert!(sensor.available());
    }

    #[tokio::test]
    async fn should_propagate_unknown_user() {
        let mut client = ScriptedClient::default();
        client
            .login_failures
            .push_back(ClientError::InvalidCredentials {
                reason: "Incorrect username or password".to_string(),
            });
        let (data, _clock) = shared(client);
        let mut sensor = sensor(&data, SensorKind::SleepNumber);

        let err = sensor.update().await.unwrap_err();

        assert!(matches!(err, SleepIqError::UnknownUser(_)));
    }

    #[tokio::test]
    async fn should_fall_back_to_unique_id_when_bed_is_removed() {
        let mut client = ScriptedClient::returning(vec![fixtures::bed("abc123")]);
        client.responses.push_back(Ok(vec![fixtures::bed("def456")]));
        let (data, clock) = shared(client);
        let mut sensor = sensor(&data, SensorKind::SleepNumber);

        sensor.update().await.unwrap();
        clock.advance(31);
        sensor.update().await.unwrap();

        assert_eq!(sensor.name(), "Sleep Number abc123 left sleep_number");
        assert!(sensor.attributes().contains_key("sleeper"));
    }

    #[tokio::test]
    async fn should_project_sleep_number_entity() {
        let (data, _clock) = shared(ScriptedClient::returning(vec![fixtures::bed("abc123")]));
        let mut sensor = sensor(&data, SensorKind::SleepNumber);
        sensor.update().await.unwrap();
        let device_id = DeviceId::new();

        let entity = sensor.to_entity(device_id).unwrap();

        assert_eq!(entity.entity_id, "sensor.sleepnumber_abc123_left_sleep_number");
        assert_eq!(entity.device_id, device_id);
        assert_eq!(entity.state, EntityState::On);
        assert_eq!(entity.get_attribute("sleep_number"), Some(&AttributeValue::Int(45)));
        assert_eq!(
            entity.get_attribute("icon"),
            Some(&AttributeValue::String("mdi:bed".to_string()))
        );
        assert_eq!(
            entity.get_attribute("assumed_state"),
            Some(&AttributeValue::Bool(false))
        );
    }

    #[tokio::test]
    async fn should_project_occupancy_as_on_off() {
        let (data, _clock) = shared(ScriptedClient::returning(vec![fixtures::bed("abc123")]));
        let mut left = sensor(&data, SensorKind::IsInBed);
        let mut right = SleepIqSensor::new(Arc::clone(&data), "abc123", Side::Right, SensorKind::IsInBed);
        left.update().await.unwrap();
        right.update().await.unwrap();

        let left = left.to_entity(DeviceId::new()).unwrap();
        let right = right.to_entity(DeviceId::new()).unwrap();

        assert_eq!(left.entity_id, "binary_sensor.sleepnumber_abc123_left_is_in_bed");
        assert_eq!(left.state, EntityState::On);
        assert_eq!(right.state, EntityState::Off);
        assert_eq!(
            left.get_attribute("device_class"),
            Some(&AttributeValue::String("occupancy".to_string()))
        );
    }

    #[test]
    fn should_project_unavailable_state_before_first_update() {
        let (data, _clock) = shared(ScriptedClient::default());
        let sensor = sensor(&data, SensorKind::IsInBed);

        let entity = sensor.to_entity(DeviceId::new()).unwrap();

        assert_eq!(entity.state, EntityState::Unavailable);
        assert_eq!(entity.friendly_name, "Sleep Number abc123 left is_in_bed");
    }

    #[tokio::test]
    async fn should_project_bed_as_device() {
        let (data, _clock) = shared(ScriptedClient::returning(vec![fixtures::bed("abc123")]));
        let mut sensor = sensor(&data, SensorKind::SleepNumber);
        sensor.update().await.unwrap();

        let device = sensor.to_device().unwrap();

        assert_eq!(device.name, "Sleep Number Master");
        assert_eq!(device.unique_id, "abc123");
        assert_eq!(device.integration, "sleepiq");
        assert_eq!(device.model.as_deref(), Some("P5"));
    }

    #[test]
    fn should_slugify_bed_ids_in_entity_ids() {
        let (data, _clock) = shared(ScriptedClient::default());
        let sensor = SleepIqSensor::new(data, "-9223372036", Side::Right, SensorKind::SleepNumber);
        assert_eq!(sensor.entity_id(), "sensor.sleepnumber__9223372036_right_sleep_number");
    }
}
