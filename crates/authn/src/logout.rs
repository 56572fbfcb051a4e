//! Best-effort logout notification.
//!
//! When a session ends the backend is told via `POST /api/logout` so it can
//! drop server-side session state. The notification is advisory: transport
//! errors and error statuses are logged and swallowed, and local credential
//! removal always runs afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};

use crate::{
    config::MonitorConfig,
    error::{AuthError, Result},
    monitor::{InvalidationEvent, InvalidationHandler},
    store::CredentialStore,
};

/// Notifies the backend of a logout and clears the local credential.
///
/// Usable directly for explicit logout ([`logout`](Self::logout)) or as the
/// [`InvalidationHandler`] passed to
/// [`TokenMonitor::start`](crate::TokenMonitor::start). An optional `next`
/// handler (e.g. redirect to the login page) runs after local cleanup.
pub struct LogoutNotifier {
    client: Client,
    logout_url: String,
    store: Arc<dyn CredentialStore>,
    next: Option<Arc<dyn InvalidationHandler>>,
}

impl LogoutNotifier {
    /// Creates a notifier posting to `config.logout_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the configuration is invalid, or
    /// [`AuthError::LogoutFailed`] if the HTTP client cannot be built.
    pub fn new(config: &MonitorConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, logout_url: config.logout_url.clone(), store, next: None })
    }

    /// Chains a handler that runs after the credential is cleared.
    #[must_use]
    pub fn then(mut self, next: Arc<dyn InvalidationHandler>) -> Self {
        self.next = Some(next);
        self
    }

    /// Explicit logout: notifies the backend using the stored credential,
    /// then clears it regardless of the outcome.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) {
        let token = self.store.get();
        self.notify_and_clear(token.as_deref()).await;
    }

    async fn notify_and_clear(&self, token: Option<&str>) {
        if let Err(err) = self.notify(token).await {
            tracing::warn!(error = %err, url = %self.logout_url, "logout notification failed");
        }
        self.store.clear();
    }

    /// Sends the logout notification.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::LogoutFailed`] on transport failure or a
    /// non-success status.
    pub async fn notify(&self, token: Option<&str>) -> Result<()> {
        let mut request = self.client.post(&self.logout_url);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::logout_failed(format!("server responded with {status}")));
        }

        tracing::debug!(status = status.as_u16(), "logout notified");
        Ok(())
    }
}

#[async_trait]
impl InvalidationHandler for LogoutNotifier {
    async fn on_invalid(&self, event: InvalidationEvent) {
        self.notify_and_clear(event.token.as_deref()).await;
        if let Some(next) = &self.next {
            next.on_invalid(event).await;
        }
    }
}
