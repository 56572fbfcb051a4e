//! Credential decoding and expiry checks.
//!
//! The stored credential is a compact three-segment token
//! (`header.payload.signature`). Signatures are not verified here: the
//! backend does that on every request. This module only answers "is the
//! local session still usable", which requires the shape check and the
//! `exp` claim.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use foundation_common_authn::jwt::{is_token_valid_at, remaining_time_at};
//!
//! let token = "not-a-token";
//! assert!(!is_token_valid_at(token, Utc::now()));
//! assert!(remaining_time_at(token, Utc::now()).is_zero());
//! ```

use std::time::Duration;

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::AuthError;

/// Base64url engine that accepts payloads with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Number of dot-separated segments in a compact token.
const SEGMENT_COUNT: usize = 3;

/// Splits a token into its segments, rejecting any shape other than three
/// non-empty parts.
///
/// No decoding happens here, so malformed tokens are rejected cheaply.
///
/// # Errors
///
/// Returns [`AuthError::InvalidTokenFormat`] on the wrong segment count or an
/// empty segment.
pub fn split_segments(token: &str) -> Result<[&str; SEGMENT_COUNT], AuthError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != SEGMENT_COUNT {
        return Err(AuthError::invalid_token_format(format!(
            "token must have {SEGMENT_COUNT} parts separated by dots, got {}",
            parts.len()
        )));
    }
    if parts.iter().any(|p| p.is_empty()) {
        return Err(AuthError::invalid_token_format("token has an empty segment"));
    }
    Ok([parts[0], parts[1], parts[2]])
}

/// Decodes the payload segment into a JSON object without verifying the
/// signature.
///
/// # Errors
///
/// Returns an error if:
/// - The token does not have exactly 3 non-empty parts
/// - The payload cannot be base64url-decoded
/// - The payload is not JSON, or is JSON but not an object
pub fn decode_claims(token: &str) -> Result<Map<String, Value>, AuthError> {
    let [_, payload, _] = split_segments(token)?;

    let payload_bytes = PAYLOAD_ENGINE.decode(payload).map_err(|e| {
        AuthError::invalid_token_format(format!("failed to decode token payload: {e}"))
    })?;

    let value: Value = serde_json::from_slice(&payload_bytes).map_err(|e| {
        AuthError::invalid_token_format(format!("failed to parse token claims: {e}"))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(AuthError::invalid_token_format(format!(
            "token claims must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Returns the `exp` claim converted to milliseconds since the epoch.
///
/// Fractional seconds are accepted since the claim is only required to be
/// numeric.
///
/// # Errors
///
/// Returns [`AuthError::MissingClaim`] if `exp` is absent or not a number,
/// plus every error from [`decode_claims`].
pub fn expiry_millis(token: &str) -> Result<f64, AuthError> {
    let claims = decode_claims(token)?;
    claims
        .get("exp")
        .and_then(Value::as_f64)
        .map(|exp| exp * 1000.0)
        .ok_or_else(|| AuthError::missing_claim("exp"))
}

/// Returns the remaining lifetime of `token` at `now`.
///
/// # Errors
///
/// Returns [`AuthError::TokenExpired`] once `exp * 1000 <= now`, plus every
/// error from [`expiry_millis`].
pub fn check_token_at(token: &str, now: DateTime<Utc>) -> Result<Duration, AuthError> {
    let remaining_ms = expiry_millis(token)? - now.timestamp_millis() as f64;
    if remaining_ms <= 0.0 {
        return Err(AuthError::TokenExpired);
    }
    Ok(Duration::from_millis(remaining_ms.ceil() as u64))
}

/// Fail-closed validity check: any decode or claim error means invalid.
#[must_use]
pub fn is_token_valid_at(token: &str, now: DateTime<Utc>) -> bool {
    match check_token_at(token, now) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(error = %err, "token rejected");
            false
        },
    }
}

/// `max(0, exp*1000 - now)`, or zero on any failure.
#[must_use]
pub fn remaining_time_at(token: &str, now: DateTime<Utc>) -> Duration {
    check_token_at(token, now).unwrap_or(Duration::ZERO)
}

/// [`is_token_valid_at`] against the current wall clock.
#[must_use]
pub fn is_token_valid(token: &str) -> bool {
    is_token_valid_at(token, Utc::now())
}

/// [`remaining_time_at`] against the current wall clock.
#[must_use]
pub fn remaining_time(token: &str) -> Duration {
    remaining_time_at(token, Utc::now())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::testutil::{craft_token, craft_token_with_payload, token_expiring_in};

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid timestamp")
    }

    #[rstest]
    #[case::empty("")]
    #[case::one_part("abc")]
    #[case::two_parts("abc.def")]
    #[case::four_parts("a.b.c.d")]
    #[case::empty_header(".payload.sig")]
    #[case::empty_payload("header..sig")]
    #[case::empty_signature("header.payload.")]
    #[case::only_dots("..")]
    fn test_wrong_shape_rejected_before_decoding(#[case] token: &str) {
        let result = split_segments(token);
        assert!(matches!(result, Err(AuthError::InvalidTokenFormat(_))));
        assert!(!is_token_valid_at(token, fixed_now()));
        assert_eq!(remaining_time_at(token, fixed_now()), Duration::ZERO);
    }

    #[test]
    fn test_undecodable_payload_is_invalid() {
        let result = decode_claims("header.!!!not-base64!!!.sig");
        assert!(matches!(result, Err(AuthError::InvalidTokenFormat(msg)) if msg.contains("decode")));
    }

    #[test]
    fn test_non_json_payload_is_invalid() {
        let token = craft_token_with_payload(b"not json at all");
        let result = decode_claims(&token);
        assert!(matches!(result, Err(AuthError::InvalidTokenFormat(msg)) if msg.contains("parse")));
    }

    #[rstest]
    #[case::number(json!(42))]
    #[case::string(json!("exp"))]
    #[case::array(json!([1, 2, 3]))]
    #[case::null(json!(null))]
    fn test_non_object_payload_is_invalid(#[case] payload: Value) {
        let token = craft_token(&payload);
        let result = decode_claims(&token);
        assert!(
            matches!(result, Err(AuthError::InvalidTokenFormat(msg)) if msg.contains("object"))
        );
    }

    #[rstest]
    #[case::absent(json!({"sub": "user-1"}))]
    #[case::string(json!({"exp": "1700003600"}))]
    #[case::null(json!({"exp": null}))]
    fn test_missing_or_non_numeric_exp(#[case] payload: Value) {
        let token = craft_token(&payload);
        let result = expiry_millis(&token);
        assert!(matches!(result, Err(AuthError::MissingClaim(claim)) if claim == "exp"));
        assert!(!is_token_valid_at(&token, fixed_now()));
    }

    #[test]
    fn test_expired_one_second_ago() {
        let now = fixed_now();
        let token = craft_token(&json!({"exp": now.timestamp() - 1}));
        assert!(matches!(check_token_at(&token, now), Err(AuthError::TokenExpired)));
        assert!(!is_token_valid_at(&token, now));
        assert_eq!(remaining_time_at(&token, now), Duration::ZERO);
    }

    #[test]
    fn test_expiry_exactly_now_is_expired() {
        let now = fixed_now();
        let token = craft_token(&json!({"exp": now.timestamp()}));
        assert!(!is_token_valid_at(&token, now));
    }

    #[test]
    fn test_valid_for_an_hour() {
        let now = fixed_now();
        let token = craft_token(&json!({"exp": now.timestamp() + 3600}));
        assert!(is_token_valid_at(&token, now));
        assert_eq!(remaining_time_at(&token, now), Duration::from_secs(3600));
    }

    #[test]
    fn test_fractional_exp_is_accepted() {
        let now = fixed_now();
        let token = craft_token(&json!({"exp": now.timestamp() as f64 + 1.5}));
        assert_eq!(remaining_time_at(&token, now), Duration::from_millis(1500));
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let now = fixed_now();
        let token = craft_token(&json!({"exp": now.timestamp() + 60}));
        let [header, payload, sig] = split_segments(&token).expect("three segments");
        let padding = "=".repeat((4 - payload.len() % 4) % 4);
        let padded = format!("{header}.{payload}{padding}.{sig}");
        assert!(is_token_valid_at(&padded, now));
    }

    #[test]
    fn test_wall_clock_helpers() {
        let token = token_expiring_in(chrono::Duration::minutes(10));
        assert!(is_token_valid(&token));
        assert!(remaining_time(&token) > Duration::from_secs(590));

        let expired = token_expiring_in(chrono::Duration::seconds(-1));
        assert!(!is_token_valid(&expired));
        assert!(remaining_time(&expired).is_zero());
    }
}
