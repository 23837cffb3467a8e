//! Database operations for scores and leaderboard queries.

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::*;

use crate::entity::{github_user, score, user};
use crate::error::AppResult;
use crate::models::leaderboard::{LeaderboardEntry, LeaderboardOrder};
use crate::models::user::Principal;

/// Maximum number of rows returned by a leaderboard query.
pub const LEADERBOARD_LIMIT: u64 = 10;

#[derive(Debug, FromQueryResult)]
struct LeaderboardRow {
    username: Option<String>,
    score: i32,
    avg_speed: f64,
    avatar: Option<String>,
}

/// Append a score row for the given principal. Returns the new row id.
pub async fn insert(
    db: &DatabaseConnection,
    principal: Principal,
    score_value: i32,
    avg_speed: f64,
) -> AppResult<i32> {
    let (user_id, github_user_id) = match principal {
        Principal::Local(id) => (Some(id), None),
        Principal::GitHub(id) => (None, Some(id)),
    };

    let model = score::ActiveModel {
        user_id: Set(user_id),
        github_user_id: Set(github_user_id),
        score: Set(score_value),
        avg_speed: Set(avg_speed),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(inserted.id)
}

/// Top scores joined with the owning account, best first.
///
/// Ties keep insertion order.
pub async fn top(
    db: &DatabaseConnection,
    order: LeaderboardOrder,
) -> AppResult<Vec<LeaderboardEntry>> {
    let query = score::Entity::find()
        .select_only()
        .expr_as(
            Func::coalesce([
                Expr::col((user::Entity, user::Column::Username)).into(),
                Expr::col((github_user::Entity, github_user::Column::Username)).into(),
            ]),
            "username",
        )
        .column(score::Column::Score)
        .column(score::Column::AvgSpeed)
        .column_as(user::Column::Avatar, "avatar")
        .join(JoinType::LeftJoin, score::Relation::User.def())
        .join(JoinType::LeftJoin, score::Relation::GithubUser.def())
        .filter(
            Condition::any()
                .add(user::Column::Id.is_not_null())
                .add(github_user::Column::Id.is_not_null()),
        );

    let query = match order {
        LeaderboardOrder::Score => query.order_by_desc(score::Column::Score),
        LeaderboardOrder::Speed => query.order_by_asc(score::Column::AvgSpeed),
    };

    let rows = query
        .order_by_asc(score::Column::Id)
        .limit(LEADERBOARD_LIMIT)
        .into_model::<LeaderboardRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| LeaderboardEntry {
            username: r.username.unwrap_or_default(),
            score: r.score,
            avg_speed: r.avg_speed,
            avatar: r.avatar.unwrap_or_default(),
        })
        .collect())
}
