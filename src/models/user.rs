//! User, identity and session models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Local user stored in database. The password hash never leaves the db layer.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// GitHub identity stored in `github_users`.
#[derive(Debug, Clone, Serialize)]
pub struct GitHubIdentity {
    pub id: i32,
    pub github_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// The account a session acts for.
///
/// Local users and GitHub identities are separate id namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Principal {
    Local(i32),
    GitHub(i32),
}

impl Principal {
    /// Claim value naming the namespace.
    pub fn kind(&self) -> &'static str {
        match self {
            Principal::Local(_) => "local",
            Principal::GitHub(_) => "github",
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Principal::Local(id) | Principal::GitHub(id) => *id,
        }
    }

    /// Rebuild a principal from its claim parts.
    pub fn from_parts(kind: &str, id: i32) -> Option<Self> {
        match kind {
            "local" => Some(Principal::Local(id)),
            "github" => Some(Principal::GitHub(id)),
            _ => None,
        }
    }
}

/// Authenticated session identity, resolved from the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Opaque session id
    pub session_id: String,
    pub principal: Principal,
    pub username: String,
}

/// Register/login request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsRequest {
    /// Both fields must be non-empty.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Display for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CredentialsRequest({}, [REDACTED])", self.username)
    }
}

/// Response for GET /api/user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentUserResponse {
    pub username: String,
}

/// GitHub user info from API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUserInfo {
    pub id: i64,
    pub login: String,
}

/// Session JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Opaque session id
    pub sid: String,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
    /// Principal namespace, `local` or `github`
    pub kind: String,
    pub user_id: i32,
    pub username: String,
}
