//! Proxy-rotating translation client.
//!
//! # Architecture
//!
//! ```text
//! translate(text, target, source)
//!   → empty text / source == target?  return text
//!   → cache hit?                      return cached
//!   → relays, starting at cursor:     GET relay(endpoint?q=text) → JSON → fragments
//!        success at i → cursor = (i + 1) % n, cache, return
//!   → direct GET endpoint (last resort)
//!   → everything failed:              return text unchanged
//! ```
//!
//! Attempts are strictly sequential. The cursor only moves on success, so a
//! relay that keeps failing is skipped past by the next successful call and
//! load spreads across the healthy ones.
//!
//! No method on [`Translator`] returns an error after construction:
//! translation is an enhancement, and failure degrades to the original text.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use reqwest::Url;
use serde_json::Value;

use crate::{
    cache::{AUTO_SOURCE, CacheKey, TranslationCache},
    config::TranslatorConfig,
    error::{Result, TranslateError},
    lang::Lang,
    response::{extract_source_language, extract_translation},
    transport::{HttpTransport, Transport},
};

/// Translation client with relay rotation and a write-once result cache.
///
/// Owned by the application's composition root and shared by `Arc`; all
/// methods take `&self`.
pub struct Translator {
    transport: Arc<dyn Transport>,
    config: TranslatorConfig,
    cache: TranslationCache,
    cursor: AtomicUsize,
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("cursor", &self.cursor())
            .finish()
    }
}

impl Translator {
    /// Creates a translator issuing real HTTP requests.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Config`] if the configuration is invalid,
    /// or [`TranslateError::Http`] if the HTTP client cannot be built.
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.request_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a translator over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Config`] if the configuration is invalid.
    pub fn with_transport(config: TranslatorConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            cache: TranslationCache::new(config.cache_capacity),
            config,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Returns the result cache.
    #[must_use]
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Index of the relay tried first on the next call.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Builds the endpoint URL for one request.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::InvalidUrl`] if the endpoint does not parse.
    pub fn translation_url(&self, text: &str, source: Option<Lang>, target: Lang) -> Result<Url> {
        let source = source.map_or(AUTO_SOURCE, Lang::code);
        Url::parse_with_params(&self.config.endpoint, [
            ("client", "gtx"),
            ("sl", source),
            ("tl", target.code()),
            ("dt", "t"),
            ("q", text),
        ])
        .map_err(|e| TranslateError::invalid_url(format!("endpoint: {e}")))
    }

    /// Translates `text` into `target`.
    ///
    /// `source` of `None` lets the service detect the language. Never fails:
    /// when every relay and the direct fallback fail, `text` comes back
    /// unchanged.
    #[tracing::instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn translate(&self, text: &str, target: Lang, source: Option<Lang>) -> String {
        if text.trim().is_empty() || source == Some(target) {
            return text.to_string();
        }

        let key = CacheKey::new(text, source, target);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(cache = "hit", "translation served from cache");
            return cached;
        }

        let url = match self.translation_url(text, source, target) {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(error = %err, "cannot build translation URL");
                return text.to_string();
            },
        };

        let Some(translated) = self.fetch_rotating(&url, extract_translation).await else {
            tracing::error!("all translation attempts failed, keeping original text");
            return text.to_string();
        };

        if translated == text && text.chars().count() > self.config.suspicious_len {
            tracing::warn!(
                text = %text,
                "translation identical to input, service may have ignored the request"
            );
        }

        self.cache.insert(key, translated).await
    }

    /// Translates each text in order.
    pub async fn translate_batch(
        &self,
        texts: &[&str],
        target: Lang,
        source: Option<Lang>,
    ) -> Vec<String> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.translate(text, target, source).await);
        }
        out
    }

    /// Detects the language of `text`.
    ///
    /// Returns `None` when the reported language is not one of the site's
    /// languages or when every attempt failed.
    #[tracing::instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn detect_language(&self, text: &str) -> Option<Lang> {
        if text.trim().is_empty() {
            return None;
        }

        let url = match self.translation_url(text, None, Lang::En) {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(error = %err, "cannot build detection URL");
                return None;
            },
        };

        let code = self
            .fetch_rotating(&url, |body: &Value| extract_source_language(body).map(str::to_string))
            .await;

        match code {
            Some(code) => {
                let lang = Lang::from_detected_code(&code);
                tracing::debug!(code = %code, detected = ?lang, "language detected");
                lang
            },
            None => {
                tracing::error!("language detection failed");
                None
            },
        }
    }

    /// Drops every cached translation.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("translation cache cleared");
    }

    /// Drops cached translations into `lang`, keeping the others.
    pub async fn clear_cache_for_language(&self, lang: Lang) -> usize {
        let removed = self.cache.clear_language(lang).await;
        tracing::info!(lang = %lang, removed, "translation cache cleared for language");
        removed
    }

    /// Tries every relay once from the cursor, then the direct endpoint.
    async fn fetch_rotating<T, F>(&self, target: &Url, extract: F) -> Option<T>
    where
        F: Fn(&Value) -> Option<T>,
    {
        let proxies = &self.config.proxies;
        let count = proxies.len();
        let start = if count == 0 { 0 } else { self.cursor() % count };

        for offset in 0..count {
            let index = (start + offset) % count;
            let proxy = &proxies[index];

            let attempt = match proxy.wrap(target.as_str()) {
                Ok(url) => self.attempt(&url, &extract).await,
                Err(err) => Err(err),
            };

            match attempt {
                Ok(value) => {
                    self.cursor.store((index + 1) % count, Ordering::Release);
                    tracing::debug!(proxy = %proxy.name, index, "proxy attempt succeeded");
                    return Some(value);
                },
                Err(err) => {
                    tracing::warn!(proxy = %proxy.name, index, error = %err, "proxy attempt failed");
                },
            }
        }

        if self.config.direct_fallback {
            match self.attempt(target, &extract).await {
                Ok(value) => {
                    tracing::debug!("direct request succeeded");
                    return Some(value);
                },
                Err(err) => tracing::warn!(error = %err, "direct request failed"),
            }
        }

        None
    }

    async fn attempt<T, F>(&self, url: &Url, extract: &F) -> Result<T>
    where
        F: Fn(&Value) -> Option<T>,
    {
        let body = self.transport.get(url.as_str()).await?;
        let value: Value = serde_json::from_str(&body)?;
        extract(&value).ok_or(TranslateError::EmptyTranslation)
    }
}
