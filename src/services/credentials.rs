//! Local username/password accounts.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::external::AvatarSource;
use crate::auth::CredentialHasher;
use crate::db::{self, DbPool, users::InsertOutcome};
use crate::error::AppError;
use crate::models::User;

/// Registration and login failures.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Username already exists")]
    UsernameTaken,

    /// Unknown user or wrong password; the two are never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Internal(#[from] AppError),
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::UsernameTaken => AppError::Conflict(err.to_string()),
            CredentialError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            CredentialError::Internal(e) => e,
        }
    }
}

/// Creates local accounts and checks their passwords.
#[derive(Clone)]
pub struct CredentialStore {
    pool: DbPool,
    hasher: CredentialHasher,
    avatars: Arc<dyn AvatarSource>,
}

impl CredentialStore {
    pub fn new(pool: DbPool, hasher: CredentialHasher, avatars: Arc<dyn AvatarSource>) -> Self {
        Self {
            pool,
            hasher,
            avatars,
        }
    }

    /// Create a local user. Usernames are unique and compared exactly.
    ///
    /// The avatar lookup is best-effort; its failure leaves the avatar empty.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        let conn = self.pool.connection();
        if db::users::username_exists(conn, username).await? {
            return Err(CredentialError::UsernameTaken);
        }

        let hash = {
            let hasher = self.hasher.clone();
            let password = password.to_owned();
            tokio::task::spawn_blocking(move || hasher.hash(&password))
                .await
                .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))??
        };

        let avatar = match self.avatars.random_avatar().await {
            Ok(url) if !url.is_empty() => Some(url),
            Ok(_) => None,
            Err(e) => {
                debug!("Avatar lookup failed for new user: {}", e);
                None
            }
        };

        // The unique index settles races the pre-check above cannot see.
        match db::users::insert(conn, username, &hash, avatar.as_deref()).await? {
            InsertOutcome::Inserted(user) => {
                info!("Registered user '{}' (id={})", user.username, user.id);
                Ok(user)
            }
            InsertOutcome::UsernameTaken => Err(CredentialError::UsernameTaken),
        }
    }

    /// Check a username/password pair and return the user id.
    ///
    /// Unknown usernames still pay for one hash verification.
    pub async fn validate(&self, username: &str, password: &str) -> Result<i32, CredentialError> {
        let stored = db::users::find_credentials(self.pool.connection(), username).await?;

        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || match stored {
            Some((id, hash)) => hasher.verify(&hash, &password).then_some(id),
            None => {
                hasher.verify_dummy(&password);
                None
            }
        })
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?;

        verified.ok_or_else(|| {
            warn!("Failed login attempt for '{}'", username);
            CredentialError::InvalidCredentials
        })
    }

    /// Look up a local user by id.
    pub async fn find_user(&self, id: i32) -> Result<Option<User>, CredentialError> {
        Ok(db::users::find_by_id(self.pool.connection(), id).await?)
    }
}
