// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locale selection from request signals.
//!
//! Pure decision logic with no knowledge of HTTP types. Signals are checked
//! in strict priority order:
//!
//! 1. stored preference, but only for migrated callers;
//! 2. network country code, which decides on its own whenever present;
//! 3. browser language preferences;
//! 4. the fallback locale.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Country codes served the primary locale, compared exactly as the edge sends them.
const PRIMARY_COUNTRIES: &[&str] = &["UA"];

/// Language tags (substring match) that map to the primary locale.
const PRIMARY_LANGUAGE_HINTS: &[&str] = &["uk", "ua", "ru"];

/// A supported site locale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Primary locale.
    Ua,
    /// Fallback locale.
    En,
}

impl Locale {
    /// Locale used when nothing else decides.
    pub const FALLBACK: Locale = Locale::En;

    /// Parses a stored preference; only exact supported codes are accepted.
    pub fn from_code(code: &str) -> Option<Locale> {
        match code {
            "ua" => Some(Locale::Ua),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Ua => "ua",
            Locale::En => "en",
        }
    }
}

/// Everything the resolver looks at, borrowed from the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocaleSignals<'a> {
    /// The caller passed the one-time migration (`LOCALE_MIGRATED=1`).
    pub migrated: bool,
    /// Stored preference cookie value.
    pub stored: Option<&'a str>,
    /// Country code supplied by the network edge.
    pub country: Option<&'a str>,
    /// Raw `Accept-Language` header.
    pub accept_language: Option<&'a str>,
}

/// Resolves the locale for one request.
pub fn resolve_locale(signals: &LocaleSignals<'_>) -> Locale {
    if signals.migrated {
        if let Some(locale) = signals.stored.and_then(Locale::from_code) {
            return locale;
        }
    }

    if let Some(country) = signals.country {
        return if PRIMARY_COUNTRIES.contains(&country) {
            Locale::Ua
        } else {
            Locale::En
        };
    }

    if let Some(header) = signals.accept_language {
        let header = header.to_ascii_lowercase();
        if PRIMARY_LANGUAGE_HINTS.iter().any(|hint| header.contains(hint)) {
            return Locale::Ua;
        }
    }

    Locale::FALLBACK
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn signals<'a>(
        migrated: bool,
        stored: Option<&'a str>,
        country: Option<&'a str>,
        accept_language: Option<&'a str>,
    ) -> LocaleSignals<'a> {
        LocaleSignals {
            migrated,
            stored,
            country,
            accept_language,
        }
    }

    #[test]
    fn migrated_preference_beats_country() {
        let s = signals(true, Some("ua"), Some("US"), None);
        assert_eq!(resolve_locale(&s), Locale::Ua);
    }

    #[test]
    fn country_beats_preference_before_migration() {
        let s = signals(false, Some("ua"), Some("US"), None);
        assert_eq!(resolve_locale(&s), Locale::En);
    }

    #[test]
    fn russian_browser_without_country_gets_primary() {
        let s = signals(false, None, None, Some("ru-RU,ru;q=0.9"));
        assert_eq!(resolve_locale(&s), Locale::Ua);
    }

    #[test]
    fn no_signals_falls_back() {
        assert_eq!(resolve_locale(&LocaleSignals::default()), Locale::En);
    }

    #[test]
    fn ukrainian_country_gets_primary() {
        let s = signals(false, None, Some("UA"), Some("en-US"));
        assert_eq!(resolve_locale(&s), Locale::Ua);
    }

    #[test]
    fn country_code_must_match_exactly() {
        for country in ["ua", " UA", "Ua"] {
            let s = signals(false, None, Some(country), Some("uk-UA"));
            assert_eq!(resolve_locale(&s), Locale::En, "{country:?}");
        }
    }

    #[test]
    fn country_decides_even_when_language_would_match() {
        let s = signals(false, None, Some("DE"), Some("uk-UA,uk;q=0.9"));
        assert_eq!(resolve_locale(&s), Locale::En);
    }

    #[test]
    fn migrated_with_unsupported_cookie_falls_through_to_country() {
        let s = signals(true, Some("de"), Some("UA"), None);
        assert_eq!(resolve_locale(&s), Locale::Ua);
    }

    #[test]
    fn migrated_without_cookie_uses_language() {
        let s = signals(true, None, None, Some("uk"));
        assert_eq!(resolve_locale(&s), Locale::Ua);
    }

    #[test]
    fn stored_preference_ignored_when_not_migrated_and_no_other_signal() {
        let s = signals(false, Some("ua"), None, None);
        assert_eq!(resolve_locale(&s), Locale::En);
    }

    #[test]
    fn migrated_en_preference_is_honoured() {
        let s = signals(true, Some("en"), Some("UA"), Some("uk"));
        assert_eq!(resolve_locale(&s), Locale::En);
    }

    #[test]
    fn language_match_is_case_insensitive() {
        let s = signals(false, None, None, Some("UK-ua"));
        assert_eq!(resolve_locale(&s), Locale::Ua);
    }

    #[test]
    fn english_browser_falls_back() {
        let s = signals(false, None, None, Some("en-GB,en;q=0.8"));
        assert_eq!(resolve_locale(&s), Locale::En);
    }

    #[test]
    fn locale_codes_round_trip() {
        for locale in [Locale::Ua, Locale::En] {
            assert_eq!(Locale::from_code(locale.as_str()), Some(locale));
            assert_eq!(locale.to_string(), locale.as_str());
        }
        assert_eq!(Locale::from_code("UA"), None);
    }

    proptest! {
        #[test]
        fn any_country_header_decides(
            country in "[A-Z]{2}",
            lang in proptest::option::of("[a-z]{2}(-[A-Z]{2})?"),
            stored in proptest::option::of("ua|en"),
        ) {
            let s = signals(false, stored.as_deref(), Some(&country), lang.as_deref());
            let expected = if country == "UA" { Locale::Ua } else { Locale::En };
            prop_assert_eq!(resolve_locale(&s), expected);
        }

        #[test]
        fn migrated_supported_cookie_always_wins(
            stored in "ua|en",
            country in proptest::option::of("[A-Z]{2}"),
            lang in proptest::option::of("[a-z]{2}"),
        ) {
            let s = signals(true, Some(&stored), country.as_deref(), lang.as_deref());
            prop_assert_eq!(resolve_locale(&s).as_str(), stored.as_str());
        }
    }
}
