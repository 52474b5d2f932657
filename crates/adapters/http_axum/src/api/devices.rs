//! JSON REST handlers for devices.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use sleephub_app::ports::{DeviceRepository, EntityRepository};
use sleephub_domain::device::Device;
use sleephub_domain::id::DeviceId;

use crate::api::entities;
use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Device>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<ER, DR>(
    State(state): State<AppState<ER, DR>>,
) -> Result<ListResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
{
    let devices = state.device_service.list_devices().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/{id}`
pub async fn get<ER, DR>(
    State(state): State<AppState<ER, DR>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
{
    let device_id: DeviceId = super::parse_id("Device", &id)?;
    let device = state.device_service.get_device(device_id).await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `GET /api/devices/{id}/entities`
pub async fn list_entities<ER, DR>(
    State(state): State<AppState<ER, DR>>,
    Path(id): Path<String>,
) -> Result<entities::ListResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
{
    let device_id: DeviceId = super::parse_id("Device", &id)?;
    let device = state.device_service.get_device(device_id).await?;
    let entities = state
        .entity_service
        .list_device_entities(device.id)
        .await?;
    Ok(entities::ListResponse::Ok(Json(entities)))
}
