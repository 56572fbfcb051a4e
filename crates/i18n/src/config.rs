//! Configuration for the translation rotator.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TranslateError},
    proxy::{ProxyDescriptor, default_proxies},
};

/// Public translation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Inputs longer than this that come back unchanged are logged as suspicious.
pub const DEFAULT_SUSPICIOUS_LEN: usize = 10;

/// Configuration for [`Translator`](crate::Translator).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use foundation_common_i18n::TranslatorConfig;
///
/// let config = TranslatorConfig::builder()
///     .request_timeout(Duration::from_secs(8))
///     .cache_capacity(50_000)
///     .build();
/// config.validate()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[builder(on(String, into))]
pub struct TranslatorConfig {
    /// Translation endpoint queried directly or through a relay.
    #[serde(default = "default_endpoint")]
    #[builder(default = DEFAULT_ENDPOINT.to_string())]
    pub endpoint: String,

    /// Relays tried in rotation order.
    #[serde(default = "default_proxies")]
    #[builder(default = default_proxies())]
    pub proxies: Vec<ProxyDescriptor>,

    /// Whether to try the endpoint directly once every relay has failed.
    #[serde(default = "default_direct_fallback")]
    #[builder(default = true)]
    pub direct_fallback: bool,

    /// Per-request timeout. `None` leaves timeouts to the HTTP stack.
    #[serde(with = "humantime_serde", default)]
    pub request_timeout: Option<Duration>,

    /// Maximum cached translations. `None` keeps every translation for the
    /// process lifetime.
    #[serde(default)]
    pub cache_capacity: Option<u64>,

    /// Length above which an unchanged result is logged as suspicious.
    #[serde(default = "default_suspicious_len")]
    #[builder(default = DEFAULT_SUSPICIOUS_LEN)]
    pub suspicious_len: usize,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_direct_fallback() -> bool {
    true
}

fn default_suspicious_len() -> usize {
    DEFAULT_SUSPICIOUS_LEN
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TranslatorConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Config`] if the endpoint or any relay base
    /// URL does not parse, or if there is nothing to try at all (no relays
    /// and no direct fallback).
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.endpoint)
            .map_err(|e| TranslateError::config(format!("invalid endpoint: {e}")))?;

        for proxy in &self.proxies {
            Url::parse(&proxy.base_url).map_err(|e| {
                TranslateError::config(format!("invalid base_url for proxy '{}': {e}", proxy.name))
            })?;
            if proxy.query_param.is_empty() {
                return Err(TranslateError::config(format!(
                    "proxy '{}' has an empty query_param",
                    proxy.name
                )));
            }
        }

        if self.proxies.is_empty() && !self.direct_fallback {
            return Err(TranslateError::config(
                "at least one proxy or direct_fallback must be configured",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TranslatorConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.proxies.len(), 3);
        assert!(config.direct_fallback);
        assert!(config.request_timeout.is_none());
        assert!(config.cache_capacity.is_none());
        assert_eq!(config.suspicious_len, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: TranslatorConfig =
            serde_json::from_str(r#"{"request_timeout": "8s", "direct_fallback": false}"#)
                .expect("deserialize");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(8)));
        assert!(!config.direct_fallback);
        assert_eq!(config, TranslatorConfig {
            request_timeout: Some(Duration::from_secs(8)),
            direct_fallback: false,
            ..TranslatorConfig::default()
        });
    }

    #[test]
    fn test_bad_proxy_rejected() {
        let config = TranslatorConfig::builder()
            .proxies(vec![ProxyDescriptor::new("broken", "::", "url")])
            .build();
        assert!(matches!(config.validate(), Err(TranslateError::Config(msg)) if msg.contains("broken")));
    }

    #[test]
    fn test_nothing_to_try_rejected() {
        let config = TranslatorConfig::builder().proxies(vec![]).direct_fallback(false).build();
        assert!(matches!(config.validate(), Err(TranslateError::Config(_))));
    }
}
