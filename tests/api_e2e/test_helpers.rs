//! Shared test helpers for API E2E tests.

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use async_trait::async_trait;
use mental_math_lib::app::{AppState, Capabilities};
use mental_math_lib::auth::session::SESSION_COOKIE;
use mental_math_lib::config::{
    Config, Environment, ExternalSettings, GitHubOAuthSettings, PasswordCost, SessionSettings,
};
use mental_math_lib::db::DbPool;
use mental_math_lib::middleware::{RequestLogger, SecurityHeaders};
use mental_math_lib::models::GitHubUserInfo;
use mental_math_lib::services::external::{FixedFacts, NoAvatars, NoFacts};
use mental_math_lib::services::{IdentityProvider, OAuthError};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Session signing key used in tests.
pub const TEST_SESSION_KEY: &str = "test-session-key-for-api-e2e-0123456789";

/// Per-test database and configuration. The temp dir lives as long as this.
pub struct TestContext {
    _dir: TempDir,
    pub config: Config,
    pub pool: DbPool,
}

impl TestContext {
    /// Fresh SQLite database with migrations applied, plus page templates.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = test_config(dir.path());

        let templates = dir.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        for page in ["index", "register", "game", "leaderboard"] {
            std::fs::write(
                templates.join(format!("{page}.html")),
                format!("<html><body>{page}</body></html>"),
            )
            .unwrap();
        }
        let assets = dir.path().join("static");
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(assets.join("app.css"), "body { margin: 0; }").unwrap();

        let pool = DbPool::connect(&config.database_url, config.db_max_connections)
            .await
            .expect("failed to connect to test database");
        pool.run_migrations()
            .await
            .expect("failed to run migrations");

        Self {
            _dir: dir,
            config,
            pool,
        }
    }
}

/// Development config rooted in `dir`, with a cheap password hash.
pub fn test_config(dir: &Path) -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: format!("sqlite://{}?mode=rwc", dir.join("quiz.db").display()),
        db_max_connections: 4,
        templates_dir: dir.join("templates"),
        static_dir: dir.join("static"),
        password_cost: PasswordCost {
            iterations: 1,
            memory_kib: 64,
        },
        session: SessionSettings {
            key: SecretString::from(TEST_SESSION_KEY.to_string()),
            cookie_secure: false,
        },
        github_oauth: GitHubOAuthSettings {
            enabled: true,
            client_id: Some("test-client-id".to_string()),
            client_secret: Some(SecretString::from("test-client-secret".to_string())),
            redirect_url: "http://localhost:8080/auth/github/callback".to_string(),
        },
        external: ExternalSettings {
            avatar_api_url: "http://127.0.0.1:9/avatar".to_string(),
            facts_api_url: "http://127.0.0.1:9".to_string(),
        },
    }
}

/// No network: avatars and facts always fail, OAuth disabled.
pub fn offline() -> Capabilities {
    Capabilities {
        avatars: Arc::new(NoAvatars),
        facts: Arc::new(NoFacts),
        identity_provider: None,
    }
}

/// Offline, but every fact lookup answers `"fact about {n}"`.
pub fn with_facts() -> Capabilities {
    Capabilities {
        facts: Arc::new(FixedFacts("fact about {n}".to_string())),
        ..offline()
    }
}

/// Offline, with the given identity provider.
pub fn with_provider(provider: Arc<dyn IdentityProvider>) -> Capabilities {
    Capabilities {
        identity_provider: Some(provider),
        ..offline()
    }
}

/// Create a test app wired like the server, middleware included.
pub async fn create_test_app(
    ctx: &TestContext,
    capabilities: Capabilities,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let state = AppState::new(ctx.config.clone(), ctx.pool.clone(), capabilities)
        .expect("failed to build app state");

    test::init_service(
        App::new()
            .wrap(SecurityHeaders)
            .wrap(RequestLogger)
            .configure(move |cfg| state.configure(cfg)),
    )
    .await
}

/// The session cookie set by a response, if any.
pub fn session_cookie(resp: &ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

/// The `Location` header of a response.
pub fn location(resp: &ServiceResponse) -> Option<String> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// GET a path, optionally with a session cookie.
pub async fn get<S>(app: &S, uri: &str, cookie: Option<&Cookie<'static>>) -> ServiceResponse
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::get().uri(uri);
    if let Some(c) = cookie {
        req = req.cookie(c.clone());
    }
    test::call_service(app, req.to_request()).await
}

/// POST a JSON body, optionally with a session cookie.
pub async fn post_json<S>(
    app: &S,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&Cookie<'static>>,
) -> ServiceResponse
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::post().uri(uri).set_json(body);
    if let Some(c) = cookie {
        req = req.cookie(c.clone());
    }
    test::call_service(app, req.to_request()).await
}

/// Register a local user and return the status.
pub async fn register<S>(app: &S, username: &str, password: &str) -> StatusCode
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let body = serde_json::json!({ "username": username, "password": password });
    post_json(app, "/api/register", body, None).await.status()
}

/// Log in and return the session cookie. Panics unless the login succeeds.
pub async fn login<S>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let body = serde_json::json!({ "username": username, "password": password });
    let resp = post_json(app, "/api/login", body, None).await;
    assert_eq!(resp.status(), StatusCode::OK, "login should succeed");
    session_cookie(&resp).expect("login should set the session cookie")
}

/// Register then log in.
pub async fn signup<S>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    assert_eq!(register(app, username, password).await, StatusCode::CREATED);
    login(app, username, password).await
}

/// Scripted identity provider.
pub enum StubOutcome {
    Success(GitHubUserInfo),
    ExchangeFails,
    FetchFails,
    DecodeFails,
}

/// Identity provider double that records how far each login got.
pub struct StubProvider {
    outcome: StubOutcome,
    pub exchanges: AtomicUsize,
    pub fetches: AtomicUsize,
}

impl StubProvider {
    pub fn new(outcome: StubOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            exchanges: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn success(id: i64, login: &str) -> Arc<Self> {
        Self::new(StubOutcome::Success(GitHubUserInfo {
            id,
            login: login.to_string(),
        }))
    }

    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://github.example/authorize?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<SecretString, OAuthError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            StubOutcome::ExchangeFails => {
                Err(OAuthError::ExchangeFailed("bad_verification_code".to_string()))
            }
            _ => Ok(SecretString::from(format!("token-for-{code}"))),
        }
    }

    async fn fetch_user(&self, access_token: &SecretString) -> Result<GitHubUserInfo, OAuthError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        assert!(access_token.expose_secret().starts_with("token-for-"));
        match &self.outcome {
            StubOutcome::Success(info) => Ok(info.clone()),
            StubOutcome::FetchFails => Err(OAuthError::FetchFailed("503".to_string())),
            StubOutcome::DecodeFails => Err(OAuthError::DecodeFailed("expected value".to_string())),
            StubOutcome::ExchangeFails => unreachable!("fetch after failed exchange"),
        }
    }
}
