//! E2E tests: GitHub OAuth login.

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};
use std::sync::Arc;

use super::mock_github::MockGitHub;
use super::test_helpers::*;
use mental_math_lib::db::github_users;
use mental_math_lib::services::github_oauth::OAUTH_STATE_COOKIE;
use mental_math_lib::services::{GitHubProvider, IdentityProvider};

/// Start a login; returns the state sent to the provider and its cookie.
async fn start_login<S>(app: &S) -> (String, Cookie<'static>)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = get(app, "/auth/github/login", None).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);

    let url = location(&resp).expect("redirect location");
    let state = url
        .split("state=")
        .nth(1)
        .and_then(|s| s.split('&').next())
        .expect("state parameter")
        .to_string();

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == OAUTH_STATE_COOKIE)
        .map(|c| c.into_owned())
        .expect("state cookie");

    (state, cookie)
}

async fn callback<S>(app: &S, code: &str, state: &str, cookie: Option<&Cookie<'static>>) -> ServiceResponse
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let uri = format!("/auth/github/callback?code={}&state={}", code, state);
    get(app, &uri, cookie).await
}

/// The response removes the pending-login state cookie.
fn assert_state_cleared(resp: &ServiceResponse) {
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == OAUTH_STATE_COOKIE)
        .expect("state cookie cleared");
    assert_eq!(cleared.value(), "");
    assert_eq!(
        cleared.max_age(),
        Some(actix_web::cookie::time::Duration::ZERO)
    );
}

async fn github_user_count(ctx: &TestContext) -> u64 {
    github_users::count(ctx.pool.connection()).await.unwrap()
}

#[actix_rt::test]
async fn test_login_redirect_sets_random_state() {
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx, with_provider(StubProvider::success(1, "octo"))).await;

    let (state_a, cookie_a) = start_login(&app).await;
    let (state_b, _) = start_login(&app).await;

    assert_eq!(cookie_a.value(), state_a);
    assert_eq!(cookie_a.http_only(), Some(true));
    assert_eq!(state_a.len(), 64);
    assert_ne!(state_a, state_b);
}

#[actix_rt::test]
async fn test_successful_login_creates_session_and_identity() {
    let ctx = TestContext::new().await;
    let provider = StubProvider::success(4242, "octocat");
    let app = create_test_app(&ctx, with_provider(provider.clone())).await;

    let (state, state_cookie) = start_login(&app).await;
    let resp = callback(&app, "abc", &state, Some(&state_cookie)).await;

    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp).as_deref(), Some("/game"));
    let session = session_cookie(&resp).expect("session cookie");
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == OAUTH_STATE_COOKIE)
        .expect("state cookie cleared");
    assert_eq!(cleared.value(), "");

    assert_eq!(provider.exchanges(), 1);
    assert_eq!(provider.fetches(), 1);
    assert_eq!(github_user_count(&ctx).await, 1);

    let resp = get(&app, "/api/user", Some(&session)).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "octocat");

    // GitHub players land on the leaderboard under their GitHub name.
    let resp = post_json(
        &app,
        "/api/leaderboard/update",
        json!({ "score": 9, "avgSpeed": 1.25 }),
        Some(&session),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = get(&app, "/api/leaderboard", Some(&session)).await;
    let entries: Value = test::read_body_json(resp).await;
    assert_eq!(entries[0]["username"], "octocat");
    assert_eq!(entries[0]["score"], 9);
}

#[actix_rt::test]
async fn test_repeat_login_reuses_identity() {
    let ctx = TestContext::new().await;

    let first = create_test_app(&ctx, with_provider(StubProvider::success(7, "first-name"))).await;
    let (state, cookie) = start_login(&first).await;
    let resp = callback(&first, "c1", &state, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);

    // Same GitHub account, renamed since the first login.
    let second = create_test_app(&ctx, with_provider(StubProvider::success(7, "renamed"))).await;
    let (state, cookie) = start_login(&second).await;
    let resp = callback(&second, "c2", &state, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);

    assert_eq!(github_user_count(&ctx).await, 1);
    let stored = github_users::find_by_github_id(ctx.pool.connection(), 7)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.username, "first-name");
}

#[actix_rt::test]
async fn test_state_mismatch_rejected() {
    let ctx = TestContext::new().await;
    let provider = StubProvider::success(1, "octo");
    let app = create_test_app(&ctx, with_provider(provider.clone())).await;

    let (_, state_cookie) = start_login(&app).await;
    let resp = callback(&app, "abc", "forged-state", Some(&state_cookie)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&resp).is_none());

    let (state, _) = start_login(&app).await;
    let resp = callback(&app, "abc", &state, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(provider.exchanges(), 0);
    assert_eq!(github_user_count(&ctx).await, 0);
}

#[actix_rt::test]
async fn test_failing_exchange_creates_nothing() {
    let ctx = TestContext::new().await;
    let provider = StubProvider::new(StubOutcome::ExchangeFails);
    let app = create_test_app(&ctx, with_provider(provider.clone())).await;

    let (state, cookie) = start_login(&app).await;
    let resp = callback(&app, "expired", &state, Some(&cookie)).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(session_cookie(&resp).is_none());
    assert_state_cleared(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Failed to get token");

    assert_eq!(provider.fetches(), 0);
    assert_eq!(github_user_count(&ctx).await, 0);
}

#[actix_rt::test]
async fn test_profile_failures_have_distinct_messages() {
    for (outcome, message) in [
        (StubOutcome::FetchFails, "Failed to get user info"),
        (StubOutcome::DecodeFails, "Failed to decode user info"),
    ] {
        let ctx = TestContext::new().await;
        let app = create_test_app(&ctx, with_provider(StubProvider::new(outcome))).await;

        let (state, cookie) = start_login(&app).await;
        let resp = callback(&app, "abc", &state, Some(&cookie)).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(session_cookie(&resp).is_none());
        assert_state_cleared(&resp);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], message);
        assert_eq!(github_user_count(&ctx).await, 0);
    }
}

#[actix_rt::test]
async fn test_oauth_disabled() {
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx, offline()).await;

    let resp = get(&app, "/auth/github/login", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = callback(&app, "abc", "state", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

fn github_client(ctx: &TestContext, mock: &MockGitHub) -> Arc<dyn IdentityProvider> {
    let provider = GitHubProvider::from_settings(&ctx.config.github_oauth, mock.endpoints())
        .unwrap()
        .expect("OAuth enabled in test config");
    Arc::new(provider)
}

#[actix_rt::test]
async fn test_github_client_against_mock_server() {
    let mock = MockGitHub::start();
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx, with_provider(github_client(&ctx, &mock))).await;

    let resp = get(&app, "/auth/github/login", None).await;
    let url = location(&resp).unwrap();
    assert!(url.starts_with(&format!("{}/login/oauth/authorize?", mock.base_url)));
    assert!(url.contains("client_id=test-client-id"));

    let (state, cookie) = start_login(&app).await;
    let resp = callback(&app, "user:99:mona", &state, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let session = session_cookie(&resp).expect("session cookie");

    let resp = get(&app, "/api/user", Some(&session)).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "mona");
    assert_eq!(github_user_count(&ctx).await, 1);
}

#[actix_rt::test]
async fn test_github_client_failures_against_mock_server() {
    let mock = MockGitHub::start();

    for (code, message) in [
        ("rejected", "Failed to get token"),
        ("down", "Failed to get user info"),
        ("garbled", "Failed to decode user info"),
    ] {
        let ctx = TestContext::new().await;
        let app = create_test_app(&ctx, with_provider(github_client(&ctx, &mock))).await;

        let (state, cookie) = start_login(&app).await;
        let resp = callback(&app, code, &state, Some(&cookie)).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", code);
        assert!(session_cookie(&resp).is_none());
        assert_state_cleared(&resp);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], message, "{}", code);
        assert_eq!(github_user_count(&ctx).await, 0);
    }
}
