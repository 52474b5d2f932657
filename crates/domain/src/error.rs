//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HubError`]
//! via `#[from]` or an explicit `From` impl.

/// Boxed error used for opaque sources crossing layer boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error shared by the application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("storage error")]
    Storage(#[source] BoxError),

    /// An integration cannot reach its backend right now; setup may be retried.
    #[error("integration not ready")]
    NotReady(#[source] BoxError),

    /// An integration rejected the configured credentials; retrying will not help.
    #[error("unknown user")]
    UnknownUser(#[source] BoxError),

    /// An integration failed in a way it does not classify further.
    #[error("integration error")]
    Integration(#[source] BoxError),
}

impl HubError {
    /// Whether retrying the failed operation later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity_id must not be empty")]
    EmptyEntityId,

    #[error("entity_id must have the form `<platform>.<object_id>`, got {0:?}")]
    MalformedEntityId(String),

    #[error("integration must not be empty")]
    EmptyIntegration,
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of the missing thing (`"Entity"`, `"Device"`, …).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}
