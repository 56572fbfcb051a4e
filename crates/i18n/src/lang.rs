//! Supported site languages.

use serde::{Deserialize, Serialize};

/// A language the site is published in.
///
/// Serialized and displayed as its two-letter code, which is also the value
/// stored in the `lang` preference cookie and sent as `sl`/`tl` to the
/// translation endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Lang {
    /// Bengali.
    #[default]
    Bn,
    /// English.
    En,
    /// Arabic.
    Ar,
}

/// Writing direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TextDirection {
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
}

impl Lang {
    /// Two-letter code.
    #[must_use]
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Writing direction; Arabic is the only right-to-left language.
    #[must_use]
    pub fn direction(self) -> TextDirection {
        match self {
            Self::Ar => TextDirection::Rtl,
            Self::Bn | Self::En => TextDirection::Ltr,
        }
    }

    /// Maps a language code reported by the translation service.
    ///
    /// Accepts two- and three-letter codes in any case, with or without a
    /// region subtag (`en-US`, `ar_EG`). Returns `None` for anything else.
    #[must_use]
    pub fn from_detected_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "bn" | "ben" => Some(Self::Bn),
            "en" | "eng" => Some(Self::En),
            "ar" | "ara" => Some(Self::Ar),
            _ => None,
        }
    }

    /// Reads the `lang` preference cookie value, falling back to the default.
    #[must_use]
    pub fn from_cookie(value: Option<&str>) -> Self {
        value.and_then(Self::from_detected_code).unwrap_or_default()
    }
}
