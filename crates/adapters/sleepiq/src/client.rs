//! SleepIQ client port.
//!
//! The cache talks to the vendor service only through [`SleepIqClient`], so
//! tests can script responses and failures. [`HttpSleepIqClient`](crate::HttpSleepIqClient)
//! is the production implementation.

use std::fmt;
use std::future::Future;

use sleephub_domain::error::BoxError;

use crate::model::BedSnapshot;

/// Access to a SleepIQ account.
///
/// Both calls receive a [`ClientOutput`] buffer for incidental notices
/// (skipped records, odd payloads) that are not failures in themselves.
pub trait SleepIqClient: Send {
    /// Authenticate with the configured credentials.
    fn login(
        &mut self,
        output: &mut ClientOutput,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Fetch every bed on the account, joined with its sleepers and
    /// current per-side status.
    fn beds_with_sleeper_status(
        &mut self,
        output: &mut ClientOutput,
    ) -> impl Future<Output = Result<Vec<BedSnapshot>, ClientError>> + Send;
}

/// Failures reported by a [`SleepIqClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, TCP, TLS, timeout).
    #[error("connection to SleepIQ failed")]
    Connection(#[source] BoxError),

    /// A response arrived but did not have the expected shape.
    #[error("unexpected SleepIQ response")]
    MalformedResponse(#[source] BoxError),

    /// The service refused the username/password pair.
    #[error("SleepIQ rejected the credentials: {reason}")]
    InvalidCredentials {
        /// Reason reported for the rejection.
        reason: String,
    },

    /// Any other failure (unexpected HTTP status, client misconfiguration).
    #[error("SleepIQ request failed")]
    Unexpected(#[source] BoxError),
}

/// Text written by a client during one call sequence.
///
/// Implements [`fmt::Write`] so clients can use `writeln!`.
#[derive(Debug, Default)]
pub struct ClientOutput {
    buffer: String,
}

impl ClientOutput {
    /// Whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Everything written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Append `line` followed by a newline.
    pub fn note(&mut self, line: impl fmt::Display) {
        self.buffer.push_str(&line.to_string());
        self.buffer.push('\n');
    }
}

impl fmt::Write for ClientOutput {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}
