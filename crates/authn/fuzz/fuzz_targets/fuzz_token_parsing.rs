//! Fuzz target for credential decoding.
//!
//! Feeds arbitrary byte strings as tokens to the decoding and validity
//! functions. Every result must be either `Ok(...)` or `Err(AuthError)`,
//! and the fail-closed wrappers must agree with the fallible core.

#![no_main]

use chrono::Utc;
use libfuzzer_sys::fuzz_target;

use foundation_common_authn::jwt::{
    check_token_at, decode_claims, expiry_millis, is_token_valid_at, remaining_time_at,
    split_segments,
};

fuzz_target!(|data: &[u8]| {
    // Tokens are always UTF-8 cookie values
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };

    let now = Utc::now();

    let shape_ok = split_segments(token).is_ok();
    let claims = decode_claims(token);
    if !shape_ok {
        assert!(claims.is_err(), "malformed shape must never decode");
    }

    let _ = expiry_millis(token);

    let checked = check_token_at(token, now);
    assert_eq!(checked.is_ok(), is_token_valid_at(token, now));
    assert_eq!(remaining_time_at(token, now).is_zero(), checked.is_err());
});
