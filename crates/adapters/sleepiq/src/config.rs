//! SleepIQ integration configuration.

use serde::Deserialize;

/// Account credentials for the SleepIQ integration.
///
/// Unknown keys in the `[sleepiq]` section are ignored.
#[derive(Clone, Deserialize)]
pub struct SleepIqConfig {
    /// Sleep Number account login (usually an e-mail address).
    pub username: String,
    /// Sleep Number account password.
    pub password: String,
}

impl std::fmt::Debug for SleepIqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SleepIqConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
