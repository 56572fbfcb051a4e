//! # Foundation Common Authentication
//!
//! Client-side session handling for the foundation website and admin
//! dashboard.
//!
//! This crate provides:
//! - **Credential decoding**: shape and expiry checks on the stored compact token
//! - **Token monitor**: poll + deadline timers that invalidate an expired or malformed session
//! - **Logout notifier**: best-effort `POST /api/logout` with guaranteed local cleanup
//!
//! The backend verifies signatures on every request; nothing here does. All
//! validity checks are fail-closed: any decode failure means "invalid".
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use foundation_common_authn::{
//!     CredentialStore, LogoutNotifier, MemoryCredentialStore, MonitorConfig, TokenMonitor,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::default();
//! let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
//!
//! let notifier = Arc::new(LogoutNotifier::new(&config, Arc::clone(&store))?);
//! let monitor = TokenMonitor::new(store, config)?;
//! monitor.start(notifier).await;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Monitor configuration.
pub mod config;
/// Authentication error types.
pub mod error;
/// Credential decoding and expiry checks.
pub mod jwt;
/// Best-effort logout notification.
pub mod logout;
/// Token validity monitor.
pub mod monitor;
/// Credential storage.
pub mod store;
/// Token crafting helpers for tests.
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

// Re-export key types for convenience
pub use config::MonitorConfig;
pub use error::{AuthError, Result};
pub use logout::LogoutNotifier;
pub use monitor::{InvalidationEvent, InvalidationHandler, InvalidationReason, TokenMonitor};
pub use store::{CookieAttributes, CredentialStore, MemoryCredentialStore};
