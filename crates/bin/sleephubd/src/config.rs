//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `sleephub.toml` in the working directory. Every section has a
//! default except the SleepIQ credentials, which may also come from
//! `SLEEPIQ_USERNAME` / `SLEEPIQ_PASSWORD`. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;
use sleephub_adapter_sleepiq::SleepIqConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Poller cadence.
    pub polling: PollingConfig,
    /// SleepIQ account credentials.
    pub sleepiq: Option<SleepIqConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Host poller configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between two polls of the integration.
    pub interval_secs: u64,
    /// Seconds to wait before retrying a setup that failed as not ready.
    pub setup_retry_secs: u64,
}

impl Config {
    /// Load configuration from `sleephub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("sleephub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("SLEEPHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("SLEEPHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("SLEEPHUB_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("SLEEPHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }

        let username = var("SLEEPIQ_USERNAME");
        let password = var("SLEEPIQ_PASSWORD");
        if username.is_some() || password.is_some() {
            let sleepiq = self.sleepiq.get_or_insert_with(|| SleepIqConfig {
                username: String::new(),
                password: String::new(),
            });
            if let Some(username) = username {
                sleepiq.username = username;
            }
            if let Some(password) = password {
                sleepiq.password = password;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "polling interval must be non-zero".to_string(),
            ));
        }
        let sleepiq = self.sleepiq()?;
        if sleepiq.username.is_empty() || sleepiq.password.is_empty() {
            return Err(ConfigError::Validation(
                "sleepiq username and password must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the SleepIQ credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when no `[sleepiq]` section was
    /// given.
    pub fn sleepiq(&self) -> Result<&SleepIqConfig, ConfigError> {
        self.sleepiq.as_ref().ok_or_else(|| {
            ConfigError::Validation(
                "missing [sleepiq] section (or SLEEPIQ_USERNAME / SLEEPIQ_PASSWORD)".to_string(),
            )
        })
    }

    /// Time between two polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }

    /// Time between two setup attempts.
    #[must_use]
    pub fn setup_retry(&self) -> Duration {
        Duration::from_secs(self.polling.setup_retry_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "sleephubd=info,sleephub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            setup_retry_secs: 60,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_credentials() -> Config {
        Config {
            sleepiq: Some(SleepIqConfig {
                username: "sam@example.com".to_string(),
                password: "hunter2".to_string(),
            }),
            ..Config::default()
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.setup_retry(), Duration::from_secs(60));
        assert!(config.sleepiq.is_none());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [logging]
            filter = 'debug'

            [polling]
            interval_secs = 45
            setup_retry_secs = 10

            [sleepiq]
            username = 'sam@example.com'
            password = 'hunter2'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.poll_interval(), Duration::from_secs(45));
        assert_eq!(config.setup_retry(), Duration::from_secs(10));
        assert_eq!(config.sleepiq().unwrap().username, "sam@example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [server]
            port = 8080
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.polling.interval_secs, 30);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_missing_credentials() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_empty_password() {
        let mut config = with_credentials();
        if let Some(sleepiq) = config.sleepiq.as_mut() {
            sleepiq.password.clear();
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = with_credentials();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let mut config = with_credentials();
        config.polling.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn should_override_bind_address_from_env() {
        let mut config = Config::default();
        config.apply_overrides(vars(&[("SLEEPHUB_BIND", "127.0.0.1:8123")]));
        assert_eq!(config.bind_addr(), "127.0.0.1:8123");
    }

    #[test]
    fn should_prefer_rust_log_over_sleephub_log() {
        let mut config = Config::default();
        config.apply_overrides(vars(&[("SLEEPHUB_LOG", "info"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_take_credentials_from_env() {
        let mut config = Config::default();
        config.apply_overrides(vars(&[
            ("SLEEPIQ_USERNAME", "sam@example.com"),
            ("SLEEPIQ_PASSWORD", "hunter2"),
        ]));
        assert!(config.validate().is_ok());
        assert_eq!(config.sleepiq().unwrap().password, "hunter2");
    }

    #[test]
    fn should_override_only_given_credential() {
        let mut config = with_credentials();
        config.apply_overrides(vars(&[("SLEEPIQ_PASSWORD", "correct horse")]));
        let sleepiq = config.sleepiq().unwrap();
        assert_eq!(sleepiq.username, "sam@example.com");
        assert_eq!(sleepiq.password, "correct horse");
    }
}
