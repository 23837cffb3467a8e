//! E2E tests: authentication gates, pages and security headers.

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::test;
use serde_json::{Value, json};

use super::test_helpers::*;
use mental_math_lib::auth::session::SESSION_COOKIE;

fn assert_security_headers(resp: &actix_web::dev::ServiceResponse) {
    let h = resp.headers();
    assert_eq!(h.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(h.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(h.get(header::X_XSS_PROTECTION).unwrap(), "1; mode=block");
}

#[actix_rt::test]
async fn test_redirect_gated_routes_without_session() {
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx, offline()).await;

    for uri in [
        "/game",
        "/leaderboard-page",
        "/api/questions/random",
        "/api/leaderboard",
        "/api/leaderboard?type=speed",
    ] {
        let resp = get(&app, uri, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&resp).as_deref(), Some("/"), "{}", uri);
    }

    let resp = post_json(
        &app,
        "/api/questions/verify",
        json!({ "questionId": 1, "answer": 2, "timeSpent": 100 }),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[actix_rt::test]
async fn test_json_gated_routes_without_session() {
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx, offline()).await;

    let resp = get(&app, "/api/user", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Not logged in");

    let resp = post_json(
        &app,
        "/api/leaderboard/update",
        json!({ "score": 5, "avgSpeed": 1.5 }),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_tampered_session_rejected() {
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx, offline()).await;
    let cookie = signup(&app, "alice", "pw1").await;

    let mut chars: Vec<char> = cookie.value().chars().collect();
    let i = chars.len() - 5;
    chars[i] = if chars[i] == 'A' { 'B' } else { 'A' };
    let forged = Cookie::new(SESSION_COOKIE, chars.into_iter().collect::<String>());

    let resp = get(&app, "/api/user", Some(&forged)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = get(&app, "/game", Some(&forged)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[actix_rt::test]
async fn test_pages_are_served() {
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx, offline()).await;

    let resp = get(&app, "/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("index"));

    let resp = get(&app, "/register", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = signup(&app, "alice", "pw1").await;
    for (uri, page) in [("/game", "game"), ("/leaderboard-page", "leaderboard")] {
        let resp = get(&app, uri, Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains(page));
    }

    let resp = get(&app, "/static/app.css", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_security_headers_on_every_response() {
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx, offline()).await;

    let ok = get(&app, "/api/health", None).await;
    assert_eq!(ok.status(), StatusCode::OK);
    assert_security_headers(&ok);

    let redirect = get(&app, "/game", None).await;
    assert_eq!(redirect.status(), StatusCode::SEE_OTHER);
    assert_security_headers(&redirect);

    let unauthorized = get(&app, "/api/user", None).await;
    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
    assert_security_headers(&unauthorized);

    let missing = get(&app, "/no-such-page", None).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_security_headers(&missing);

    let bad = post_json(&app, "/api/register", json!({}), None).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    assert_security_headers(&bad);
}

#[actix_rt::test]
async fn test_health_ready_and_openapi() {
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx, offline()).await;

    let resp = get(&app, "/api/ready", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["database"], "connected");

    let resp = get(&app, "/api/openapi.json", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc: Value = test::read_body_json(resp).await;
    assert!(doc["paths"]["/api/register"].is_object());
    assert!(doc["paths"]["/api/questions/verify"].is_object());
}
