//! SleepIQ adapter error types.

use sleephub_domain::error::HubError;

use crate::client::ClientError;

/// Classified failures surfaced by the SleepIQ data cache and sensors.
#[derive(Debug, thiserror::Error)]
pub enum SleepIqError {
    /// The service is unreachable or answered with garbage.
    #[error("SleepIQ API unavailable")]
    Connection(#[source] ClientError),

    /// The credentials were rejected.
    #[error("SleepIQ login failed. Double-check your username and password.")]
    UnknownUser(#[source] ClientError),

    /// Any other client failure.
    #[error("SleepIQ client error")]
    Client(#[source] ClientError),
}

impl SleepIqError {
    /// Classify a raw client failure.
    #[must_use]
    pub fn classify(err: ClientError) -> Self {
        match err {
            ClientError::Connection(_) | ClientError::MalformedResponse(_) => Self::Connection(err),
            ClientError::InvalidCredentials { .. } => Self::UnknownUser(err),
            ClientError::Unexpected(_) => Self::Client(err),
        }
    }

    /// Whether the failure invalidates the cached beds.
    #[must_use]
    pub fn clears_cache(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::UnknownUser(_))
    }

    /// Convert into the shared [`HubError`].
    #[must_use]
    pub fn into_domain(self) -> HubError {
        match self {
            err @ Self::Connection(_) => HubError::NotReady(Box::new(err)),
            err @ Self::UnknownUser(_) => HubError::UnknownUser(Box::new(err)),
            err @ Self::Client(_) => HubError::Integration(Box::new(err)),
        }
    }
}

impl From<SleepIqError> for HubError {
    fn from(err: SleepIqError) -> Self {
        err.into_domain()
    }
}
