//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sleephub_domain::error::HubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`HubError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(HubError);

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            HubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            HubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            HubError::NotReady(err) => {
                tracing::warn!(error = %err, "backend not ready");
                (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string())
            }
            HubError::Storage(err) | HubError::UnknownUser(err) | HubError::Integration(err) => {
                tracing::error!(error = %err, kind = %self.0, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
