//! Score recording and leaderboard queries.

use tracing::info;

use crate::db::{self, DbPool};
use crate::error::AppResult;
use crate::models::{LeaderboardEntry, LeaderboardOrder, Principal};

/// Append-only score log with a top-N view.
#[derive(Clone)]
pub struct LeaderboardService {
    pool: DbPool,
}

impl LeaderboardService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record one finished game. Values are stored as submitted.
    pub async fn record_score(
        &self,
        principal: Principal,
        score: i32,
        avg_speed: f64,
    ) -> AppResult<i32> {
        let id = db::scores::insert(self.pool.connection(), principal, score, avg_speed).await?;
        info!(
            principal = principal.kind(),
            account_id = principal.id(),
            score,
            avg_speed,
            "Score recorded (id={})",
            id
        );
        Ok(id)
    }

    /// Best entries for the given ordering, at most [`db::scores::LEADERBOARD_LIMIT`].
    pub async fn top(&self, order: LeaderboardOrder) -> AppResult<Vec<LeaderboardEntry>> {
        db::scores::top(self.pool.connection(), order).await
    }
}
