//! Configuration for the token monitor and logout notifier.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Default interval between validity polls (5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default logout endpoint.
pub const DEFAULT_LOGOUT_URL: &str = "http://localhost:3000/api/logout";

/// Default timeout for the logout notification (10 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`TokenMonitor`](crate::TokenMonitor) and
/// [`LogoutNotifier`](crate::LogoutNotifier).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use foundation_common_authn::MonitorConfig;
///
/// let config = MonitorConfig::builder()
///     .poll_interval(Duration::from_secs(2))
///     .logout_url("https://foundation.example/api/logout")
///     .build();
/// config.validate()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[builder(on(String, into))]
pub struct MonitorConfig {
    /// How often the stored credential is re-validated.
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    #[builder(default = DEFAULT_POLL_INTERVAL)]
    pub poll_interval: Duration,

    /// Endpoint notified on logout.
    #[serde(default = "default_logout_url")]
    #[builder(default = DEFAULT_LOGOUT_URL.to_string())]
    pub logout_url: String,

    /// Timeout for the logout notification.
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_logout_url() -> String {
    DEFAULT_LOGOUT_URL.to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            logout_url: DEFAULT_LOGOUT_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl MonitorConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the poll interval or request timeout
    /// is zero, or the logout URL is not an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(AuthError::config("poll_interval must be non-zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(AuthError::config("request_timeout must be non-zero"));
        }
        let url = reqwest::Url::parse(&self.logout_url)
            .map_err(|e| AuthError::config(format!("invalid logout_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AuthError::config(format!(
                "logout_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }
}
