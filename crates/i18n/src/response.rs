//! Parsing of the translation endpoint's response body.
//!
//! The `translate_a/single` endpoint answers with positional nested arrays:
//!
//! ```json
//! [
//!   [["Hola mundo. ", "Hello world. ", null, null, 10], ["Adiós", "Bye", null, null, 10]],
//!   null,
//!   "en"
//! ]
//! ```
//!
//! Element 0 holds one tuple per sentence with the translated fragment
//! first; element 2 is the detected source language.

use serde_json::Value;

/// Joins the translated fragments of every sentence with single spaces.
///
/// Only trailing spaces are stripped from each fragment, so line breaks
/// inside or at the end of a sentence survive. No separator is added after
/// a fragment that already ends in whitespace. Returns `None` when the body
/// does not have the expected shape or holds no visible text.
#[must_use]
pub fn extract_translation(body: &Value) -> Option<String> {
    let sentences = body.get(0)?.as_array()?;
    let mut joined = String::new();

    for fragment in sentences.iter().filter_map(|sentence| sentence.get(0)?.as_str()) {
        let fragment = fragment.trim_end_matches(' ');
        if fragment.is_empty() {
            continue;
        }
        if !joined.is_empty() && !joined.ends_with(char::is_whitespace) {
            joined.push(' ');
        }
        joined.push_str(fragment);
    }

    if joined.trim().is_empty() {
        return None;
    }
    Some(joined)
}

/// Returns the source language code reported by the endpoint.
#[must_use]
pub fn extract_source_language(body: &Value) -> Option<&str> {
    body.get(2)?.as_str().filter(|code| !code.is_empty())
}
