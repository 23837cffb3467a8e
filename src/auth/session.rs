//! Cookie-backed sessions.
//!
//! A session is an opaque random id plus the principal it acts for, carried in
//! the `quiz_session` HttpOnly cookie as an HS256 JWT signed with
//! `SESSION_KEY`. Sessions expire after seven days; logout replaces the cookie
//! with a removal cookie.

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};

use crate::config::SessionSettings;
use crate::error::{AppError, AppResult};
use crate::models::user::{Identity, Principal, SessionClaims};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "quiz_session";
/// Session JWT issuer.
pub const SESSION_ISSUER: &str = "mental-math";
/// Session lifetime (7 days).
pub const SESSION_TTL_SECS: i64 = 86_400 * 7;

/// Why a request carries no usable session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No session cookie")]
    Missing,

    #[error("Invalid session token: {0}")]
    Invalid(String),

    #[error("Unknown session principal")]
    UnknownPrincipal,
}

/// Issues, validates and destroys sessions.
#[derive(Clone)]
pub struct SessionManager {
    key: SecretString,
    cookie_secure: bool,
}

impl SessionManager {
    pub fn new(settings: &SessionSettings) -> Self {
        Self {
            key: settings.key.clone(),
            cookie_secure: settings.cookie_secure,
        }
    }

    /// Whether cookies are issued with the `Secure` flag.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Start a session for a principal and build its cookie.
    pub fn create(
        &self,
        principal: Principal,
        username: &str,
    ) -> AppResult<(Identity, Cookie<'static>)> {
        let session_id = generate_session_id();
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(SESSION_TTL_SECS);

        let claims = SessionClaims {
            sid: session_id.clone(),
            iss: SESSION_ISSUER.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
            kind: principal.kind().to_string(),
            user_id: principal.id(),
            username: username.to_string(),
        };

        let key = EncodingKey::from_secret(self.key.expose_secret().as_bytes());
        let token = encode(&Header::default(), &claims, &key)
            .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))?;

        let mut cookie = Cookie::new(SESSION_COOKIE, token);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.cookie_secure);
        cookie.set_max_age(CookieDuration::seconds(SESSION_TTL_SECS));

        let identity = Identity {
            session_id,
            principal,
            username: username.to_string(),
        };

        Ok((identity, cookie))
    }

    /// Resolve the session carried by a request. Fails closed.
    pub fn authenticate(&self, req: &HttpRequest) -> Result<Identity, SessionError> {
        let cookie = req.cookie(SESSION_COOKIE).ok_or(SessionError::Missing)?;
        if cookie.value().is_empty() {
            return Err(SessionError::Missing);
        }
        self.verify_token(cookie.value())
    }

    /// Verify a session token and return its identity.
    pub fn verify_token(&self, token: &str) -> Result<Identity, SessionError> {
        let key = DecodingKey::from_secret(self.key.expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[SESSION_ISSUER]);
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(token, &key, &validation)
            .map_err(|e| SessionError::Invalid(e.to_string()))?
            .claims;

        let principal = Principal::from_parts(&claims.kind, claims.user_id)
            .ok_or(SessionError::UnknownPrincipal)?;

        Ok(Identity {
            session_id: claims.sid,
            principal,
            username: claims.username,
        })
    }

    /// Cookie instructing the client to drop its session.
    pub fn destroy(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE, "");
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.cookie_secure);
        cookie.make_removal();
        cookie
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("key", &"[REDACTED]")
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Generate a random opaque session id.
fn generate_session_id() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}
