//! GitHub OAuth login.
//!
//! Flow:
//! 1. GET /auth/github/login sets a random `state` in the `quiz_oauth_state`
//!    cookie and redirects to GitHub.
//! 2. GET /auth/github/callback checks `state` against the cookie, exchanges the
//!    code for an access token, fetches the GitHub profile, resolves the
//!    `github_users` row and starts a session for it.
//!
//! Every step after the state check is terminal on failure: the browser gets a
//! 500 with a static message and no session or identity row is created.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, ResponseError, get, web};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::auth::{SessionManager, secure_compare};
use crate::config::GitHubOAuthSettings;
use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{GitHubIdentity, GitHubUserInfo, Principal};
use crate::services::QuestionService;

/// OAuth CSRF state cookie.
pub const OAUTH_STATE_COOKIE: &str = "quiz_oauth_state";
/// Lifetime of a pending login.
const OAUTH_STATE_TTL_SECS: i64 = 600;
/// Landing page after a successful login.
const LOGIN_LANDING: &str = "/game";
/// HTTP connect timeout for GitHub API calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// HTTP total timeout for GitHub API calls.
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A failed step of the callback.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("user info request failed: {0}")]
    FetchFailed(String),

    #[error("user info could not be decoded: {0}")]
    DecodeFailed(String),
}

impl OAuthError {
    /// Message shown to the browser.
    pub fn client_message(&self) -> &'static str {
        match self {
            OAuthError::ExchangeFailed(_) => "Failed to get token",
            OAuthError::FetchFailed(_) => "Failed to get user info",
            OAuthError::DecodeFailed(_) => "Failed to decode user info",
        }
    }
}

impl From<OAuthError> for AppError {
    fn from(err: OAuthError) -> Self {
        warn!("OAuth: {}", err);
        AppError::Upstream(err.client_message())
    }
}

/// External identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to, carrying `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Trade an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<SecretString, OAuthError>;

    /// Fetch the profile the token belongs to.
    async fn fetch_user(&self, access_token: &SecretString) -> Result<GitHubUserInfo, OAuthError>;
}

/// GitHub endpoints. Overridable so tests can point at a local server.
#[derive(Debug, Clone)]
pub struct GitHubEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub user_url: String,
}

impl Default for GitHubEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            user_url: "https://api.github.com/user".to_string(),
        }
    }
}

/// GitHub OAuth app client.
pub struct GitHubProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_url: String,
    endpoints: GitHubEndpoints,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

impl GitHubProvider {
    /// Build a provider from settings. `None` when OAuth is not configured.
    pub fn from_settings(
        settings: &GitHubOAuthSettings,
        endpoints: GitHubEndpoints,
    ) -> AppResult<Option<Self>> {
        if !settings.enabled {
            return Ok(None);
        }
        let (Some(client_id), Some(client_secret)) =
            (settings.client_id.clone(), settings.client_secret.clone())
        else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client for OAuth: {}", e)))?;

        Ok(Some(Self {
            client,
            client_id,
            client_secret,
            redirect_url: settings.redirect_url.clone(),
            endpoints,
        }))
    }
}

#[async_trait]
impl IdentityProvider for GitHubProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&state={}&scope={}",
            self.endpoints.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(state),
            urlencoding::encode("user:email"),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<SecretString, OAuthError> {
        let response: TokenResponse = self
            .client
            .post(&self.endpoints.token_url)
            .header(header::ACCEPT.as_str(), "application/json")
            .json(&serde_json::json!({
                "client_id": self.client_id,
                "client_secret": self.client_secret.expose_secret(),
                "code": code,
                "redirect_uri": self.redirect_url,
            }))
            .send()
            .await
            .map_err(|e| OAuthError::ExchangeFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| OAuthError::ExchangeFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| OAuthError::ExchangeFailed(format!("bad token response: {}", e)))?;

        if let Some(err) = response.error {
            return Err(OAuthError::ExchangeFailed(format!("GitHub returned {}", err)));
        }

        response
            .access_token
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| OAuthError::ExchangeFailed("no access_token in response".to_string()))
    }

    async fn fetch_user(&self, access_token: &SecretString) -> Result<GitHubUserInfo, OAuthError> {
        let body = self
            .client
            .get(&self.endpoints.user_url)
            .header(
                header::AUTHORIZATION.as_str(),
                format!("Bearer {}", access_token.expose_secret()),
            )
            .header(header::USER_AGENT.as_str(), "mental-math")
            .send()
            .await
            .map_err(|e| OAuthError::FetchFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| OAuthError::FetchFailed(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| OAuthError::FetchFailed(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| OAuthError::DecodeFailed(e.to_string()))
    }
}

/// Maps provider identities onto `github_users` rows.
#[derive(Clone)]
pub struct OAuthBridge {
    provider: Option<Arc<dyn IdentityProvider>>,
    pool: DbPool,
}

impl OAuthBridge {
    pub fn new(provider: Option<Arc<dyn IdentityProvider>>, pool: DbPool) -> Self {
        Self { provider, pool }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> AppResult<&dyn IdentityProvider> {
        self.provider
            .as_deref()
            .ok_or_else(|| AppError::InvalidInput("GitHub OAuth is not configured".to_string()))
    }

    /// Where to send the browser for a login carrying `state`.
    pub fn authorize_url(&self, state: &str) -> AppResult<String> {
        Ok(self.provider()?.authorize_url(state))
    }

    /// Exchange, fetch and resolve. Nothing is written unless every provider
    /// step succeeded.
    pub async fn complete_login(&self, code: &str) -> AppResult<GitHubIdentity> {
        let provider = self.provider()?;
        let token = provider.exchange_code(code).await?;
        let info = provider.fetch_user(&token).await?;

        db::github_users::get_or_create(self.pool.connection(), info.id, &info.login)
            .await
            .map_err(|e| {
                warn!("OAuth: failed to resolve GitHub user {}: {}", info.id, e);
                AppError::Upstream("Failed to process user")
            })
    }
}

/// Configure OAuth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(github_login).service(github_callback);
}

/// Query parameters GitHub sends to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

fn generate_state() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

fn state_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(OAUTH_STATE_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_max_age(CookieDuration::seconds(OAUTH_STATE_TTL_SECS));
    cookie
}

/// Redirect to GitHub's authorization page.
///
/// GET /auth/github/login
#[get("/auth/github/login")]
pub async fn github_login(
    bridge: web::Data<OAuthBridge>,
    sessions: web::Data<SessionManager>,
) -> AppResult<HttpResponse> {
    let state = generate_state();
    let authorize_url = bridge.authorize_url(&state)?;

    Ok(HttpResponse::TemporaryRedirect()
        .cookie(state_cookie(state, sessions.cookie_secure()))
        .append_header((header::LOCATION, authorize_url))
        .finish())
}

/// Handle the GitHub callback.
///
/// GET /auth/github/callback?code=...&state=...
#[get("/auth/github/callback")]
pub async fn github_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    bridge: web::Data<OAuthBridge>,
    sessions: web::Data<SessionManager>,
    questions: web::Data<QuestionService>,
) -> AppResult<HttpResponse> {
    if !bridge.is_enabled() {
        return Err(AppError::InvalidInput(
            "GitHub OAuth is not configured".to_string(),
        ));
    }

    let expected_state = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            warn!("OAuth callback: missing state cookie");
            AppError::Unauthorized("OAuth state verification failed".to_string())
        })?;

    let provided_state = query.state.as_deref().unwrap_or("");
    if !secure_compare(&expected_state, provided_state) {
        warn!("OAuth callback: state mismatch");
        return Err(AppError::Unauthorized(
            "OAuth state verification failed".to_string(),
        ));
    }

    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing authorization code".to_string()))?;

    let mut clear_state = state_cookie(String::new(), sessions.cookie_secure());
    clear_state.make_removal();

    // The state is spent once a code has been presented, whatever the outcome.
    let identity = match bridge.complete_login(code).await {
        Ok(identity) => identity,
        Err(err) => {
            let mut response = err.error_response();
            if let Err(e) = response.add_cookie(&clear_state) {
                warn!("OAuth callback: could not clear state cookie: {}", e);
            }
            return Ok(response);
        }
    };

    // A previous session in this browser may still hold a challenge.
    if let Ok(previous) = sessions.authenticate(&req) {
        questions.forget(&previous.session_id).await;
    }

    let (session, cookie) =
        sessions.create(Principal::GitHub(identity.id), &identity.username)?;
    info!(
        "GitHub OAuth login: user='{}' (github_id={}, id={})",
        session.username, identity.github_id, identity.id
    );

    Ok(HttpResponse::TemporaryRedirect()
        .cookie(cookie)
        .cookie(clear_state)
        .append_header((header::LOCATION, LOGIN_LANDING))
        .finish())
}
