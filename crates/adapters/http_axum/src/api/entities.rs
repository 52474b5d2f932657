//! JSON REST handlers for entities.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use sleephub_app::ports::{DeviceRepository, EntityRepository};
use sleephub_domain::entity::Entity;
use sleephub_domain::id::EntityId;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Entity>>),
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
    Ok(Json<Entity>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/entities`
pub async fn list<ER, DR>(
    State(state): State<AppState<ER, DR>>,
) -> Result<ListResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
{
    let entities = state.entity_service.list_entities().await?;
    Ok(ListResponse::Ok(Json(entities)))
}

/// `GET /api/entities/{id}`
pub async fn get<ER, DR>(
    State(state): State<AppState<ER, DR>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
{
    let entity_id: EntityId = super::parse_id("Entity", &id)?;
    let entity = state.entity_service.get_entity(entity_id).await?;
    Ok(GetResponse::Ok(Json(entity)))
}
