//! Client configuration
//!
//! Scout scopes every request under an account name and authenticates with
//! the account holder's email and password over HTTP basic auth.

use crate::error::ScoutError;
use std::env;
use std::fmt;
use std::time::Duration;

/// Default Scout endpoint
pub const DEFAULT_BASE_URL: &str = "https://scoutapp.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings needed to talk to a Scout account
#[derive(Clone)]
pub struct ScoutConfig {
    /// Scout site root; a trailing slash is ignored
    pub base_url: String,
    /// Account name; the first path segment of every request
    pub account: String,
    /// Login email for basic auth
    pub email: String,
    /// Login password for basic auth
    pub password: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ScoutConfig {
    /// Create a configuration for the default endpoint
    pub fn new(
        account: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            account: account.into(),
            email: email.into(),
            password: password.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Point the configuration at another endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load configuration from environment variables
    ///
    /// * `SCOUT_ACCOUNT`, `SCOUT_EMAIL`, `SCOUT_PASSWORD` - required
    /// * `SCOUT_URL` - defaults to [`DEFAULT_BASE_URL`]
    /// * `SCOUT_TIMEOUT_SECS` - request timeout, defaults to 30
    pub fn from_env() -> Result<Self, ScoutError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScoutError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    ScoutError::Configuration(format!("{} environment variable is required", key))
                })
        };

        let account = required("SCOUT_ACCOUNT")?;
        let email = required("SCOUT_EMAIL")?;
        let password = required("SCOUT_PASSWORD")?;

        let base_url = lookup("SCOUT_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = lookup("SCOUT_TIMEOUT_SECS")
            .map(|value| {
                value.trim().parse::<u64>().map_err(|_| {
                    ScoutError::Configuration(format!(
                        "SCOUT_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                        value
                    ))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            base_url,
            account,
            email,
            password,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl fmt::Debug for ScoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoutConfig")
            .field("base_url", &self.base_url)
            .field("account", &self.account)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ScoutConfig::from_lookup(lookup_from(&[
            ("SCOUT_ACCOUNT", "acme"),
            ("SCOUT_EMAIL", "ops@acme.test"),
            ("SCOUT_PASSWORD", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.account, "acme");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ScoutConfig::from_lookup(lookup_from(&[
            ("SCOUT_ACCOUNT", "acme"),
            ("SCOUT_EMAIL", "ops@acme.test"),
            ("SCOUT_PASSWORD", "secret"),
            ("SCOUT_URL", "http://localhost:3000"),
            ("SCOUT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_missing_account() {
        let err = ScoutConfig::from_lookup(lookup_from(&[
            ("SCOUT_EMAIL", "ops@acme.test"),
            ("SCOUT_PASSWORD", "secret"),
        ]))
        .unwrap_err();

        match err {
            ScoutError::Configuration(msg) => assert!(msg.contains("SCOUT_ACCOUNT")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_lookup_blank_password_is_missing() {
        let err = ScoutConfig::from_lookup(lookup_from(&[
            ("SCOUT_ACCOUNT", "acme"),
            ("SCOUT_EMAIL", "ops@acme.test"),
            ("SCOUT_PASSWORD", "   "),
        ]))
        .unwrap_err();

        assert!(matches!(err, ScoutError::Configuration(_)));
    }

    #[test]
    fn test_from_lookup_bad_timeout() {
        let err = ScoutConfig::from_lookup(lookup_from(&[
            ("SCOUT_ACCOUNT", "acme"),
            ("SCOUT_EMAIL", "ops@acme.test"),
            ("SCOUT_PASSWORD", "secret"),
            ("SCOUT_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ScoutError::Configuration(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ScoutConfig::new("acme", "ops@acme.test", "secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
