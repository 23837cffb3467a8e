//! Database operations for GitHub identities.

use chrono::Utc;
use sea_orm::*;

use crate::entity::github_user;
use crate::error::{AppError, AppResult};
use crate::models::user::GitHubIdentity;

/// Find or create the identity row for a GitHub account.
///
/// The first stored name wins; later logins do not re-sync it. A concurrent
/// first login that loses the insert race falls back to the winner's row.
pub async fn get_or_create(
    db: &DatabaseConnection,
    github_id: i64,
    username: &str,
) -> AppResult<GitHubIdentity> {
    if let Some(existing) = find_by_github_id(db, github_id).await? {
        return Ok(existing);
    }

    let model = github_user::ActiveModel {
        github_id: Set(github_id),
        username: Set(username.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match model.insert(db).await {
        Ok(m) => Ok(model_to_identity(m)),
        Err(e) if super::is_unique_violation(&e) => find_by_github_id(db, github_id)
            .await?
            .ok_or_else(|| {
                AppError::Database("GitHub identity vanished after conflict".to_string())
            }),
        Err(e) => Err(e.into()),
    }
}

/// Look up an identity by the provider's numeric id.
pub async fn find_by_github_id(
    db: &DatabaseConnection,
    github_id: i64,
) -> AppResult<Option<GitHubIdentity>> {
    let result = github_user::Entity::find()
        .filter(github_user::Column::GithubId.eq(github_id))
        .one(db)
        .await?;

    Ok(result.map(model_to_identity))
}

/// Count stored identities.
pub async fn count(db: &DatabaseConnection) -> AppResult<u64> {
    Ok(github_user::Entity::find().count(db).await?)
}

fn model_to_identity(m: github_user::Model) -> GitHubIdentity {
    GitHubIdentity {
        id: m.id,
        github_id: m.github_id,
        username: m.username,
        created_at: m.created_at,
    }
}
