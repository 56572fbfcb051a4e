//! # Foundation Common i18n
//!
//! Translation support for the foundation website.
//!
//! This crate provides:
//! - **Languages**: the site's language set with text direction and cookie parsing
//! - **Translator**: proxy-rotating client for the public translation endpoint
//! - **Cache**: write-once per-process cache of translated strings
//!
//! Translation never fails from the caller's point of view: when every relay
//! and the direct fallback fail, the original text is returned unchanged and
//! the failure is logged.
//!
//! ## Example
//!
//! ```no_run
//! use foundation_common_i18n::{Lang, Translator, TranslatorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let translator = Translator::new(TranslatorConfig::default())?;
//! let text = translator.translate("We help families in need", Lang::Bn, Some(Lang::En)).await;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Translation result cache.
pub mod cache;
/// Translator configuration.
pub mod config;
/// Translation error types.
pub mod error;
/// Supported languages.
pub mod lang;
/// CORS relay descriptors.
pub mod proxy;
/// Endpoint response parsing.
pub mod response;
/// Proxy-rotating translation client.
pub mod translator;
/// HTTP transport seam.
pub mod transport;

// Re-export key types for convenience
pub use cache::{CacheKey, TranslationCache};
pub use config::TranslatorConfig;
pub use error::{Result, TranslateError};
pub use lang::{Lang, TextDirection};
pub use proxy::{ProxyDescriptor, default_proxies};
pub use translator::Translator;
pub use transport::{HttpTransport, Transport};
