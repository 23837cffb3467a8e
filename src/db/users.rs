//! Database operations for local users.

use chrono::Utc;
use sea_orm::*;

use crate::entity::user;
use crate::error::AppResult;
use crate::models::user::User;

/// Result of a user insert.
#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(User),
    /// The unique index on `username` rejected the row
    UsernameTaken,
}

/// Check whether a username is already registered.
pub async fn username_exists(db: &DatabaseConnection, username: &str) -> AppResult<bool> {
    let count = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Insert a new user inside a transaction.
///
/// The pre-check in the credential store is advisory; a duplicate that slips
/// past it is caught here by the unique index and reported as `UsernameTaken`.
pub async fn insert(
    db: &DatabaseConnection,
    username: &str,
    password_hash: &str,
    avatar: Option<&str>,
) -> AppResult<InsertOutcome> {
    let txn = db.begin().await?;

    let model = user::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password_hash.to_string()),
        avatar: Set(avatar.map(|s| s.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = match model.insert(&txn).await {
        Ok(m) => m,
        Err(e) if super::is_unique_violation(&e) => {
            txn.rollback().await?;
            return Ok(InsertOutcome::UsernameTaken);
        }
        Err(e) => return Err(e.into()),
    };

    txn.commit().await?;

    Ok(InsertOutcome::Inserted(model_to_user(inserted)))
}

/// Fetch the id and password hash for a username.
pub async fn find_credentials(
    db: &DatabaseConnection,
    username: &str,
) -> AppResult<Option<(i32, String)>> {
    let result = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;

    Ok(result.map(|m| (m.id, m.password)))
}

/// Find a user by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Option<User>> {
    let result = user::Entity::find_by_id(id).one(db).await?;
    Ok(result.map(model_to_user))
}

fn model_to_user(m: user::Model) -> User {
    User {
        id: m.id,
        username: m.username,
        avatar: m.avatar,
        created_at: m.created_at,
    }
}
