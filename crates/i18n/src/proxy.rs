//! CORS relay descriptors.
//!
//! Each relay forwards a GET to an arbitrary URL passed in one query
//! parameter. The rotator treats them as interchangeable: any one of them
//! may be down or rate limited at a given moment.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TranslateError};

/// A named relay endpoint and how to hand it the target URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyDescriptor {
    /// Short name used in logs.
    pub name: String,
    /// Relay endpoint, without query string.
    pub base_url: String,
    /// Query parameter carrying the percent-encoded target URL.
    pub query_param: String,
}

impl ProxyDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        query_param: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), base_url: base_url.into(), query_param: query_param.into() }
    }

    /// Builds the relayed URL for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::InvalidUrl`] if `base_url` does not parse.
    pub fn wrap(&self, target: &str) -> Result<Url> {
        Url::parse_with_params(&self.base_url, [(self.query_param.as_str(), target)]).map_err(
            |e| TranslateError::invalid_url(format!("proxy '{}': {e}", self.name)),
        )
    }
}

/// The three relays used by the public site, in rotation order.
#[must_use]
pub fn default_proxies() -> Vec<ProxyDescriptor> {
    vec![
        ProxyDescriptor::new("allorigins", "https://api.allorigins.win/raw", "url"),
        ProxyDescriptor::new("corsproxy", "https://corsproxy.io/", "url"),
        ProxyDescriptor::new("codetabs", "https://api.codetabs.com/v1/proxy", "quest"),
    ]
}
