// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locale routing for page requests.
//!
//! Page paths are normalized and redirected to a locale prefix chosen by
//! [`resolve_locale`]. API, admin and health paths pass through untouched.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use revline_core::{Locale, LocaleSignals, resolve_locale};
use serde::Serialize;

/// Stored locale preference.
pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

/// Set once the caller's preference was chosen by the current rules.
pub const MIGRATED_COOKIE: &str = "LOCALE_MIGRATED";

const LOCALE_COOKIE_DAYS: i64 = 30;
const MIGRATED_COOKIE_DAYS: i64 = 365;

/// Edge-supplied country headers, checked in order.
const COUNTRY_HEADERS: &[&str] = &["x-vercel-ip-country", "cf-ipcountry"];

const SKIPPED_PREFIXES: &[&str] = &["/api", "/admin", "/telegram-app", "/health"];

/// Public sections that exist under every locale.
const LOCALE_AGNOSTIC_PREFIXES: &[&str] = &[
    "/auto",
    "/moto",
    "/brands",
    "/blog",
    "/contact",
    "/about",
    "/partnership",
    "/choice",
    "/privacy",
    "/terms",
    "/cookies",
    "/categories",
];

/// Countries refused on page routes.
#[derive(Debug, Clone, Default)]
pub struct LocalePolicy {
    pub blocked_countries: Vec<String>,
}

impl LocalePolicy {
    pub fn is_blocked(&self, country: &str) -> bool {
        self.blocked_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country))
    }
}

/// What the middleware does with one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleRoute {
    /// Hand the request on.
    Pass,
    /// 403 for a blocked country.
    Blocked,
    /// 308 to the same path without the trailing slash.
    TrimSlash(String),
    /// 307 from `/` to the locale root, remembering the choice.
    Root(Locale),
    /// 308 to the path under a locale prefix.
    Localize(String),
}

/// Country code from the first edge header present.
pub fn country(headers: &HeaderMap) -> Option<&str> {
    COUNTRY_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|c| !c.is_empty())
    })
}

/// Resolves the caller's locale from headers and cookies.
pub fn locale_for(headers: &HeaderMap) -> Locale {
    let jar = CookieJar::from_headers(headers);
    let stored = jar.get(LOCALE_COOKIE).map(|c| c.value().to_string());
    let migrated = jar.get(MIGRATED_COOKIE).is_some_and(|c| c.value() == "1");
    resolve_locale(&LocaleSignals {
        migrated,
        stored: stored.as_deref(),
        country: country(headers),
        accept_language: headers
            .get("accept-language")
            .and_then(|v| v.to_str().ok()),
    })
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn has_locale(path: &str) -> bool {
    under(path, "/ua") || under(path, "/en")
}

fn with_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_string(),
    }
}

/// Decides how a page request is routed.
pub fn route(
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
    policy: &LocalePolicy,
) -> LocaleRoute {
    if SKIPPED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return LocaleRoute::Pass;
    }
    if country(headers).is_some_and(|c| policy.is_blocked(c)) {
        return LocaleRoute::Blocked;
    }
    if path.len() > 1
        && let Some(trimmed) = path.strip_suffix('/')
    {
        return LocaleRoute::TrimSlash(with_query(trimmed, query));
    }
    if path == "/" {
        return LocaleRoute::Root(locale_for(headers));
    }
    if !has_locale(path) && LOCALE_AGNOSTIC_PREFIXES.iter().any(|p| under(path, p)) {
        let locale = locale_for(headers);
        return LocaleRoute::Localize(with_query(&format!("/{locale}{path}"), query));
    }
    LocaleRoute::Pass
}

fn preference_cookies(jar: CookieJar, locale: Locale) -> CookieJar {
    jar.add(
        Cookie::build((LOCALE_COOKIE, locale.as_str()))
            .path("/")
            .max_age(time::Duration::days(LOCALE_COOKIE_DAYS))
            .build(),
    )
    .add(
        Cookie::build((MIGRATED_COOKIE, "1"))
            .path("/")
            .max_age(time::Duration::days(MIGRATED_COOKIE_DAYS))
            .build(),
    )
}

/// Applies [`route`] to every request.
pub async fn locale_middleware(
    State(policy): State<Arc<LocalePolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri();
    let decision = route(uri.path(), uri.query(), request.headers(), &policy);

    match decision {
        LocaleRoute::Pass => next.run(request).await,
        LocaleRoute::Blocked => (StatusCode::FORBIDDEN, "Access Denied").into_response(),
        LocaleRoute::TrimSlash(location) | LocaleRoute::Localize(location) => {
            Redirect::permanent(&location).into_response()
        }
        LocaleRoute::Root(locale) => {
            let jar = preference_cookies(CookieJar::new(), locale);
            (jar, Redirect::temporary(&format!("/{locale}"))).into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocaleResponse {
    pub locale: Locale,
}

/// `GET /api/locale`
pub async fn get_locale(headers: HeaderMap) -> Json<LocaleResponse> {
    Json(LocaleResponse {
        locale: locale_for(&headers),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn policy() -> LocalePolicy {
        LocalePolicy {
            blocked_countries: vec!["RU".to_string()],
        }
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn api_paths_pass_even_when_blocked() {
        let h = headers(&[("x-vercel-ip-country", "RU")]);
        for path in ["/api/contact", "/admin/messages", "/telegram-app", "/health"] {
            assert_eq!(route(path, None, &h, &policy()), LocaleRoute::Pass);
        }
    }

    #[test]
    fn blocked_country_is_refused() {
        let h = headers(&[("cf-ipcountry", "ru")]);
        assert_eq!(route("/en/auto", None, &h, &policy()), LocaleRoute::Blocked);
    }

    #[test]
    fn trailing_slash_is_trimmed_with_query() {
        let h = HeaderMap::new();
        assert_eq!(
            route("/en/blog/", Some("page=2"), &h, &policy()),
            LocaleRoute::TrimSlash("/en/blog?page=2".to_string())
        );
    }

    #[test]
    fn root_resolves_locale() {
        let h = headers(&[("x-vercel-ip-country", "UA")]);
        assert_eq!(route("/", None, &h, &policy()), LocaleRoute::Root(Locale::Ua));
        assert_eq!(
            route("/", None, &HeaderMap::new(), &policy()),
            LocaleRoute::Root(Locale::En)
        );
    }

    #[test]
    fn agnostic_section_gets_prefix() {
        let h = headers(&[("accept-language", "uk-UA,uk;q=0.9")]);
        assert_eq!(
            route("/auto/bmw", Some("ref=x"), &h, &policy()),
            LocaleRoute::Localize("/ua/auto/bmw?ref=x".to_string())
        );
    }

    #[test]
    fn localized_and_unknown_paths_pass() {
        let h = HeaderMap::new();
        assert_eq!(route("/ua/auto", None, &h, &policy()), LocaleRoute::Pass);
        assert_eq!(route("/en", None, &h, &policy()), LocaleRoute::Pass);
        assert_eq!(route("/automobiles", None, &h, &policy()), LocaleRoute::Pass);
    }

    #[test]
    fn migrated_cookie_preference_wins() {
        let h = headers(&[
            ("cookie", "NEXT_LOCALE=ua; LOCALE_MIGRATED=1"),
            ("x-vercel-ip-country", "US"),
        ]);
        assert_eq!(locale_for(&h), Locale::Ua);

        let h = headers(&[("cookie", "NEXT_LOCALE=ua"), ("x-vercel-ip-country", "US")]);
        assert_eq!(locale_for(&h), Locale::En);
    }

    #[test]
    fn empty_country_header_is_ignored() {
        let h = headers(&[("x-vercel-ip-country", ""), ("accept-language", "ru")]);
        assert_eq!(country(&h), None);
        assert_eq!(locale_for(&h), Locale::Ua);
    }
}
