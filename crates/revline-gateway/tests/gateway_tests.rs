// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests driving the gateway with `tower::ServiceExt::oneshot`
//! over a real temporary database.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use revline_config::model::RevlineConfig;
use revline_core::LeadStatus;
use revline_gateway::{AppState, SESSION_COOKIE, SessionSigner, router};
use revline_test_utils::TestHarness;
use serde_json::{Value, json};
use tower::ServiceExt;

const PASSWORD: &str = "letmein-please";
const SESSION_SECRET: &str = "a-session-secret-of-thirty-two-chars!!";
const ADMIN_SECRET: &str = "ops-secret";
const CRON_SECRET: &str = "cron-secret";

fn config() -> RevlineConfig {
    let mut config = RevlineConfig::default();
    config.security.admin_password = Some(PASSWORD.into());
    config.security.session_secret = Some(SESSION_SECRET.into());
    config.security.admin_api_secret = Some(ADMIN_SECRET.into());
    config.security.cron_secret = Some(CRON_SECRET.into());
    config.rate_limit.max_requests = 3;
    config
}

async fn app_with(config: RevlineConfig) -> (TestHarness, Router) {
    let harness = TestHarness::builder()
        .with_config(config)
        .build()
        .await
        .unwrap();
    let state = AppState::new(
        &harness.config,
        harness.service.clone(),
        harness.jobs.clone(),
        harness.bot.clone(),
        Arc::new(harness.rate_limiter.clone()),
    );
    (harness, router(state))
}

async fn app() -> (TestHarness, Router) {
    app_with(config()).await
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    Reply {
        status,
        headers,
        body,
    }
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

fn session_token() -> String {
    SessionSigner::new(SESSION_SECRET, 3600)
        .issue(chrono::Utc::now().timestamp_millis())
        .unwrap()
}

fn contact(model: &str) -> Value {
    json!({
        "type": "auto",
        "carModel": model,
        "email": "buyer@example.com",
        "name": "Iryna",
        "phone": "+380501112233",
    })
}

async fn submit(app: &Router) -> String {
    let reply = send(app, json_request(Method::POST, "/api/contact", contact("BMW X5"))).await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.body["messageId"].as_str().unwrap().to_string()
}

fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

// --- intake ---

#[tokio::test]
async fn contact_submission_is_stored_as_new() {
    let (harness, app) = app().await;

    let id = submit(&app).await;

    let lead = harness.service.get(&id).await.unwrap();
    assert_eq!(lead.status, LeadStatus::New);
    assert_eq!(lead.name, "Iryna");
}

#[tokio::test]
async fn invalid_contact_is_rejected_before_storage() {
    let (harness, app) = app().await;

    let body = json!({"type": "moto", "email": "rider@example.com"});
    let reply = send(&app, json_request(Method::POST, "/api/contact", body)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "Missing required moto fields");
    assert_eq!(harness.storage.lead_stats().await.unwrap().total, 0);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (_harness, app) = app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let reply = send(&app, request).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "Invalid request body");
}

#[tokio::test]
async fn partnership_submission_is_general() {
    let (harness, app) = app().await;

    let body = json!({
        "companyName": "Detail Pro",
        "type": "detailing",
        "contactName": "Oleh",
        "email": "oleh@detail.pro",
        "phone": "+380671234567",
    });
    let reply = send(&app, json_request(Method::POST, "/api/partnership", body)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["ok"], true);
    let id = reply.body["messageId"].as_str().unwrap();
    assert!(harness.service.get(id).await.unwrap().is_partnership());
}

#[tokio::test]
async fn intake_is_rate_limited_per_caller() {
    let (_harness, app) = app().await;

    let from = |ip: &str| {
        let mut request = json_request(Method::POST, "/api/contact", contact("Audi Q7"));
        request
            .headers_mut()
            .insert("x-forwarded-for", ip.parse().unwrap());
        request
    };

    for _ in 0..3 {
        assert_eq!(send(&app, from("203.0.113.9")).await.status, StatusCode::OK);
    }
    let limited = send(&app, from("203.0.113.9, 10.0.0.1")).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.body["error"], "Rate limited");
    assert!(limited.headers.contains_key(header::RETRY_AFTER));

    assert_eq!(send(&app, from("198.51.100.4")).await.status, StatusCode::OK);
}

// --- admin session ---

#[tokio::test]
async fn inbox_requires_a_session() {
    let (_harness, app) = app().await;

    let reply = send(&app, get("/api/messages")).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "Unauthorized");

    let reply = send(&app, with_bearer(get("/api/messages"), "1.2.3")).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_cookie_that_opens_the_inbox() {
    let (_harness, app) = app().await;
    submit(&app).await;

    let wrong = send(
        &app,
        json_request(Method::POST, "/api/admin/auth", json!({"password": "guess"})),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"], "Invalid password");

    let login = send(
        &app,
        json_request(Method::POST, "/api/admin/auth", json!({"password": PASSWORD})),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["success"], true);

    let cookie = set_cookies(&login.headers)
        .into_iter()
        .find(|c| c.starts_with(SESSION_COOKIE))
        .expect("session cookie should be set");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    let pair = cookie.split(';').next().unwrap().to_string();

    let mut request = get("/api/messages");
    request
        .headers_mut()
        .insert(header::COOKIE, pair.parse().unwrap());
    let inbox = send(&app, request).await;
    assert_eq!(inbox.status, StatusCode::OK);
    assert_eq!(inbox.body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(inbox.body["stats"]["total"], 1);

    let mut request = get("/api/admin/auth");
    request
        .headers_mut()
        .insert(header::COOKIE, pair.parse().unwrap());
    assert_eq!(send(&app, request).await.body["authenticated"], true);
    assert_eq!(send(&app, get("/api/admin/auth")).await.body["authenticated"], false);
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let (_harness, app) = app().await;

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/admin/auth")
        .body(Body::empty())
        .unwrap();
    let reply = send(&app, request).await;

    assert_eq!(reply.status, StatusCode::OK);
    let cookies = set_cookies(&reply.headers);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with(SESSION_COOKIE) && c.contains("Max-Age=0"))
    );
}

#[tokio::test]
async fn login_is_disabled_without_password() {
    let (_harness, app) = app_with(RevlineConfig::default()).await;

    let reply = send(
        &app,
        json_request(Method::POST, "/api/admin/auth", json!({"password": ""})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

// --- inbox ---

#[tokio::test]
async fn list_filters_and_rejects_bad_status() {
    let (_harness, app) = app().await;
    submit(&app).await;
    let token = session_token();

    let reply = send(&app, with_bearer(get("/api/messages?status=REPLIED"), &token)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body["messages"].as_array().unwrap().is_empty());

    let reply = send(&app, with_bearer(get("/api/messages?category=auto"), &token)).await;
    assert_eq!(reply.body["messages"].as_array().unwrap().len(), 1);

    let reply = send(&app, with_bearer(get("/api/messages?status=LOST"), &token)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "Invalid status");
}

#[tokio::test]
async fn status_update_and_delete() {
    let (_harness, app) = app().await;
    let id = submit(&app).await;
    let token = session_token();
    let uri = format!("/api/messages/{id}");

    let bad = send(
        &app,
        with_bearer(json_request(Method::PATCH, &uri, json!({"status": "DONE"})), &token),
    )
    .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.body["error"], "Invalid status");

    let missing = send(&app, with_bearer(json_request(Method::PATCH, &uri, json!({})), &token)).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "Status is required");

    let updated = send(
        &app,
        with_bearer(
            json_request(Method::PATCH, &uri, json!({"status": "IN_PROGRESS"})),
            &token,
        ),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "IN_PROGRESS");

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    let deleted = send(&app, with_bearer(delete, &token)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["ok"], true);

    let gone = send(&app, with_bearer(get(&uri), &token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["error"], "Message not found");
}

#[tokio::test]
async fn reply_loop_over_http() {
    let (harness, app) = app().await;
    let id = submit(&app).await;
    let token = session_token();
    let reply_uri = format!("/api/messages/{id}/reply");

    let unknown = send(
        &app,
        with_bearer(
            json_request(
                Method::POST,
                "/api/messages/nope/reply",
                json!({"content": "Hello"}),
            ),
            &token,
        ),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["error"], "Message not found");

    let blank = send(
        &app,
        with_bearer(json_request(Method::POST, &reply_uri, json!({"content": "  "})), &token),
    )
    .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["error"], "Reply content is required");

    let sent = send(
        &app,
        with_bearer(
            json_request(
                Method::POST,
                &reply_uri,
                json!({"content": "We have one in stock", "sendToTelegram": false}),
            ),
            &token,
        ),
    )
    .await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.body["ok"], true);
    assert_eq!(sent.body["forwarded"], false);
    assert_eq!(sent.body["reply"]["sentVia"], "email");

    let listed = send(&app, with_bearer(get(&reply_uri), &token)).await;
    let replies = listed.body["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["content"], "We have one in stock");

    let detail = send(&app, with_bearer(get(&format!("/api/messages/{id}")), &token)).await;
    assert_eq!(detail.body["status"], "REPLIED");
    assert_eq!(detail.body["replies"].as_array().unwrap().len(), 1);
    assert_eq!(
        harness.service.get(&id).await.unwrap().status,
        LeadStatus::Replied
    );
}

#[tokio::test]
async fn replies_of_unknown_lead_are_not_found() {
    let (_harness, app) = app().await;

    let reply = send(
        &app,
        with_bearer(get("/api/messages/missing/reply"), &session_token()),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

// --- shared-secret endpoints ---

#[tokio::test]
async fn operator_management_needs_its_secret() {
    let (_harness, app) = app().await;

    assert_eq!(
        send(&app, get("/api/telegram/admins")).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        send(&app, get("/api/telegram/admins?secret=cron-secret")).await.status,
        StatusCode::UNAUTHORIZED
    );

    let added = send(
        &app,
        get("/api/telegram/admins?secret=ops-secret&action=add&id=12345&name=Olha&role=superadmin"),
    )
    .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.body["operator"]["telegramId"], 12345);
    assert_eq!(added.body["operator"]["role"], "superadmin");

    let listed = send(
        &app,
        with_bearer(get("/api/telegram/admins?action=list"), ADMIN_SECRET),
    )
    .await;
    assert_eq!(listed.body["operators"].as_array().unwrap().len(), 1);

    let missing = send(
        &app,
        get("/api/telegram/admins?secret=ops-secret&action=remove&id=999"),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let usage = send(&app, get("/api/telegram/admins?secret=ops-secret")).await;
    assert!(usage.body["usage"].is_string());
}

#[tokio::test]
async fn analytics_reports_behind_operator_secret() {
    let (_harness, app) = app().await;
    submit(&app).await;
    submit(&app).await;

    assert_eq!(
        send(&app, get("/api/telegram/analytics")).await.status,
        StatusCode::UNAUTHORIZED
    );

    let full = send(&app, get("/api/telegram/analytics?secret=ops-secret")).await;
    assert_eq!(full.status, StatusCode::OK);
    assert_eq!(full.body["stats"]["period"], "week");
    assert_eq!(full.body["stats"]["totalMessages"], 2);
    assert_eq!(full.body["stats"]["messagesByCategory"]["AUTO"], 2);
    assert_eq!(full.body["conversion"]["answered"], 0);
    assert_eq!(full.body["activity"]["hourly"].as_array().unwrap().len(), 24);
    assert_eq!(full.body["topSources"], json!([{"source": "contact", "count": 2}]));
    assert!(full.body["generatedAt"].is_string());

    let sources = send(
        &app,
        with_bearer(get("/api/telegram/analytics?type=sources&period=day"), ADMIN_SECRET),
    )
    .await;
    assert_eq!(sources.status, StatusCode::OK);
    assert_eq!(sources.body, json!({"sources": [{"source": "contact", "count": 2}]}));

    let bad = send(&app, get("/api/telegram/analytics?secret=ops-secret&period=year")).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    let bad = send(&app, get("/api/telegram/analytics?secret=ops-secret&type=funnel")).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unset_secrets_fail_closed() {
    let (_harness, app) = app_with(RevlineConfig::default()).await;

    for uri in [
        "/api/telegram/admins?secret=",
        "/api/telegram/admins?secret=anything",
        "/api/telegram/analytics?secret=anything",
        "/api/telegram/cron?secret=anything",
    ] {
        assert_eq!(send(&app, get(uri)).await.status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn cron_runs_requested_task() {
    let (_harness, app) = app().await;

    let idle = send(&app, get("/api/telegram/cron?secret=cron-secret")).await;
    assert_eq!(idle.status, StatusCode::OK);
    assert_eq!(idle.body["sent"], false);
    assert_eq!(idle.body["reason"], "No reminders needed");

    let unknown = send(&app, get("/api/telegram/cron?secret=cron-secret&task=bogus")).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.body["error"], "Unknown task: bogus");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/telegram/cron?task=all")
        .body(Body::empty())
        .unwrap();
    let all = send(&app, with_bearer(request, CRON_SECRET)).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["digest"]["reason"], "No activity today");
    assert_eq!(all.body["reminders"]["sent"], false);
}

// --- webhook ---

fn private_text(text: &str) -> Value {
    json!({
        "update_id": 77,
        "message": {
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {"id": 555, "type": "private", "first_name": "Taras"},
            "from": {"id": 555, "is_bot": false, "first_name": "Taras", "username": "taras_moto"},
            "text": text,
        }
    })
}

#[tokio::test]
async fn webhook_acknowledges_malformed_updates() {
    let (_harness, app) = app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/telegram/webhook")
        .body(Body::from("garbage"))
        .unwrap();
    let reply = send(&app, request).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["ok"], true);
}

#[tokio::test]
async fn webhook_turns_visitor_text_into_lead() {
    let (harness, app) = app().await;

    let reply = send(
        &app,
        json_request(
            Method::POST,
            "/api/telegram/webhook",
            private_text("Do you have exhausts for a Ducati?"),
        ),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(harness.storage.lead_stats().await.unwrap().general, 1);
    assert!(!harness.messenger.sent_to(555).await.is_empty());
}

#[tokio::test]
async fn webhook_checks_secret_token_when_configured() {
    let mut config = config();
    config.telegram.webhook_secret = Some("hook-secret".into());
    let (harness, app) = app_with(config).await;

    let denied = send(
        &app,
        json_request(Method::POST, "/api/telegram/webhook", private_text("hi")),
    )
    .await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
    assert_eq!(harness.storage.lead_stats().await.unwrap().total, 0);

    let mut request = json_request(Method::POST, "/api/telegram/webhook", private_text("hi"));
    request.headers_mut().insert(
        "x-telegram-bot-api-secret-token",
        "hook-secret".parse().unwrap(),
    );
    assert_eq!(send(&app, request).await.status, StatusCode::OK);
    assert_eq!(harness.storage.lead_stats().await.unwrap().total, 1);
}

#[tokio::test]
async fn webhook_without_telegram_still_acknowledges() {
    let harness = TestHarness::builder()
        .with_config(config())
        .without_telegram()
        .build()
        .await
        .unwrap();
    let app = router(AppState::new(
        &harness.config,
        harness.service.clone(),
        harness.jobs.clone(),
        harness.bot.clone(),
        Arc::new(harness.rate_limiter.clone()),
    ));

    let reply = send(
        &app,
        json_request(Method::POST, "/api/telegram/webhook", private_text("hi")),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(harness.storage.lead_stats().await.unwrap().total, 0);
}

// --- locale routing ---

fn page(uri: &str, headers: &[(&'static str, &str)]) -> Request<Body> {
    let mut request = get(uri);
    for (name, value) in headers {
        request
            .headers_mut()
            .insert(*name, value.parse().unwrap());
    }
    request
}

#[tokio::test]
async fn root_redirects_to_resolved_locale() {
    let (_harness, app) = app().await;

    let reply = send(&app, page("/", &[("x-vercel-ip-country", "UA")])).await;

    assert_eq!(reply.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(reply.headers[header::LOCATION], "/ua");
    let cookies = set_cookies(&reply.headers);
    assert!(cookies.iter().any(|c| c.starts_with("NEXT_LOCALE=ua")));
    assert!(cookies.iter().any(|c| c.starts_with("LOCALE_MIGRATED=1")));
}

#[tokio::test]
async fn page_paths_are_normalized() {
    let (_harness, app) = app().await;

    let reply = send(&app, page("/en/blog/", &[])).await;
    assert_eq!(reply.status, StatusCode::PERMANENT_REDIRECT);
    assert_eq!(reply.headers[header::LOCATION], "/en/blog");

    let reply = send(
        &app,
        page("/moto/ducati?color=red", &[("accept-language", "uk-UA,uk;q=0.9")]),
    )
    .await;
    assert_eq!(reply.status, StatusCode::PERMANENT_REDIRECT);
    assert_eq!(reply.headers[header::LOCATION], "/ua/moto/ducati?color=red");
}

#[tokio::test]
async fn blocked_country_gets_403_on_pages_only() {
    let (_harness, app) = app().await;

    let reply = send(&app, page("/en", &[("x-vercel-ip-country", "RU")])).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.body, Value::String("Access Denied".into()));

    let reply = send(&app, page("/api/locale", &[("x-vercel-ip-country", "RU")])).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["locale"], "en");
}

#[tokio::test]
async fn locale_endpoint_honours_migrated_cookie() {
    let (_harness, app) = app().await;

    let reply = send(
        &app,
        page(
            "/api/locale",
            &[
                ("cookie", "NEXT_LOCALE=ua; LOCALE_MIGRATED=1"),
                ("x-vercel-ip-country", "US"),
            ],
        ),
    )
    .await;
    assert_eq!(reply.body["locale"], "ua");
}

#[tokio::test]
async fn health_reports_storage() {
    let (_harness, app) = app().await;

    let reply = send(&app, get("/health")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "healthy");
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let (_harness, app) = app().await;

    let reply = send(&app, get("/api/nothing-here")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["error"], "Not found");
}
