// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input cleanup for form fields.

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Removes every `<...>` tag and trims surrounding whitespace.
///
/// Escaping for HTML output happens later, where values are embedded.
pub fn strip_tags(input: &str) -> String {
    TAG.replace_all(input, "").trim().to_string()
}

/// [`strip_tags`] over an optional field, mapping empty results to `None`.
pub fn clean(input: Option<&str>) -> Option<String> {
    input.map(strip_tags).filter(|s| !s.is_empty())
}
