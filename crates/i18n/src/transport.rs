//! HTTP transport seam.
//!
//! The rotator only needs "GET this URL, give me the body on success".
//! Keeping that behind [`Transport`] lets tests script per-proxy failures
//! without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, TranslateError};

/// Issues GET requests for the rotator.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns the body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Http`] on transport failure and
    /// [`TranslateError::Status`] on a non-success status.
    async fn get(&self, url: &str) -> Result<String>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with an optional per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Http`] if the client cannot be built.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { client: builder.build()? })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(response.text().await?)
    }
}
