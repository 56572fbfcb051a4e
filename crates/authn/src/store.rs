//! Credential storage.
//!
//! The session credential lives in the `accessToken` cookie. This module
//! abstracts that slot behind [`CredentialStore`] so the monitor can read and
//! clear it without knowing where it lives, and provides
//! [`CookieAttributes`] for rendering the matching `Set-Cookie` values.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Cookie name holding the session credential.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie name holding the UI language preference.
pub const LANG_COOKIE: &str = "lang";

/// Storage slot for the session credential.
///
/// Implementations must be cheap to call: the monitor reads the slot on
/// every poll tick.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, if any.
    fn get(&self) -> Option<String>;

    /// Replaces the stored credential.
    fn set(&self, token: String);

    /// Removes the stored credential. Idempotent.
    fn clear(&self);
}

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Mutex::new(Some(token.into())) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn set(&self, token: String) {
        *self.token.lock() = Some(token);
    }

    fn clear(&self) {
        self.token.lock().take();
    }
}

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    /// Sent only on same-site requests.
    #[default]
    Strict,
    /// Sent on same-site requests and top-level navigations.
    Lax,
    /// Sent on all requests (requires `Secure`).
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Attributes for the credential cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieAttributes {
    /// Cookie name.
    pub name: String,
    /// Cookie path.
    pub path: String,
    /// `SameSite` policy.
    pub same_site: SameSite,
    /// Whether the `Secure` flag is set.
    pub secure: bool,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            name: ACCESS_TOKEN_COOKIE.to_string(),
            path: "/".to_string(),
            same_site: SameSite::Strict,
            secure: false,
        }
    }
}

impl CookieAttributes {
    /// Attributes for a site served from `origin`; `Secure` is set for HTTPS.
    #[must_use]
    pub fn for_origin(origin: &str) -> Self {
        let secure = origin.trim_start().to_ascii_lowercase().starts_with("https://");
        Self { secure, ..Self::default() }
    }

    /// Renders the `Set-Cookie` value storing `token`.
    #[must_use]
    pub fn set_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; SameSite={}",
            self.name,
            token,
            self.path,
            self.same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Renders the `Set-Cookie` value removing the credential.
    #[must_use]
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path={}; Max-Age=0; SameSite={}",
            self.name,
            self.path,
            self.same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
