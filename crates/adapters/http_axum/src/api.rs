//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod entities;

use std::str::FromStr;

use axum::Router;
use axum::routing::get;

use sleephub_app::ports::{DeviceRepository, EntityRepository};
use sleephub_domain::error::{HubError, NotFoundError};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<ER, DR>() -> Router<AppState<ER, DR>>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/entities", get(entities::list::<ER, DR>))
        .route("/entities/{id}", get(entities::get::<ER, DR>))
        .route("/devices", get(devices::list::<ER, DR>))
        .route("/devices/{id}", get(devices::get::<ER, DR>))
        .route("/devices/{id}/entities", get(devices::list_entities::<ER, DR>))
}

/// Parse a path id; an unparseable id cannot exist, so it reports as not found.
fn parse_id<T: FromStr>(kind: &'static str, raw: &str) -> Result<T, ApiError> {
    T::from_str(raw).map_err(|_| {
        ApiError::from(HubError::from(NotFoundError {
            entity: kind,
            id: raw.to_string(),
        }))
    })
}
