//! Shared test utilities for credential testing.
//!
//! This module provides helpers for crafting compact tokens with arbitrary
//! payloads. Signatures are placeholders: nothing in this crate verifies
//! them. It is compiled for unit tests and behind the `testutil` feature for
//! downstream crates.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! foundation-common-authn = { path = "../authn", features = ["testutil"] }
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use serde_json::{Value, json};

/// Placeholder signature segment.
const FAKE_SIGNATURE: &str = "c2lnbmF0dXJl";

/// Crafts a token whose payload is the raw `payload` bytes.
///
/// Useful for producing payloads that are not valid JSON.
#[must_use]
pub fn craft_token_with_payload(payload: &[u8]) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"EdDSA","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(payload);
    format!("{header}.{payload}.{FAKE_SIGNATURE}")
}

/// Crafts a token whose payload is the given JSON value.
///
/// # Panics
///
/// Panics if the value cannot be serialized (never happens for `Value`).
#[must_use]
#[allow(clippy::expect_used)]
pub fn craft_token(payload: &Value) -> String {
    let bytes = serde_json::to_vec(payload).expect("serialize payload");
    craft_token_with_payload(&bytes)
}

/// Crafts a token expiring `lifetime` from the current wall clock.
///
/// A negative `lifetime` yields an already-expired token.
#[must_use]
pub fn token_expiring_in(lifetime: chrono::Duration) -> String {
    let exp = (Utc::now() + lifetime).timestamp();
    craft_token(&json!({
        "sub": "member:test",
        "iat": Utc::now().timestamp(),
        "exp": exp,
    }))
}
