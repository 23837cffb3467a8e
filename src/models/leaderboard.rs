//! Leaderboard and score models.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Ordering of the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
pub enum LeaderboardOrder {
    /// Highest score first
    #[default]
    Score,
    /// Lowest average answer time first
    Speed,
}

impl LeaderboardOrder {
    /// Parse the `type` query parameter. Anything but `speed` orders by score.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("speed") => Self::Speed,
            _ => Self::Score,
        }
    }
}

/// Query parameters for GET /api/leaderboard.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// `score` (default) or `speed`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: i32,
    pub avg_speed: f64,
    pub avatar: String,
}

/// Final game result submitted by the client.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub score: i32,
    pub avg_speed: f64,
}
