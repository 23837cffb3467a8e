//! Leaderboard API handlers.

use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{PageSession, SessionUser};
use crate::error::AppResult;
use crate::models::{LeaderboardEntry, LeaderboardOrder, LeaderboardQuery, ScoreSubmission};
use crate::services::LeaderboardService;

/// Response for a recorded score.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreRecordedResponse {
    pub status: &'static str,
}

/// Top ten entries, by score (default) or by speed.
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    tag = "Leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard entries", body = Vec<LeaderboardEntry>),
        (status = 303, description = "Not logged in; redirect to /"),
    )
)]
#[get("/api/leaderboard")]
pub async fn get_leaderboard(
    _session: PageSession,
    leaderboard: web::Data<LeaderboardService>,
    query: web::Query<LeaderboardQuery>,
) -> AppResult<HttpResponse> {
    let order = LeaderboardOrder::parse(query.kind.as_deref());
    let entries = leaderboard.top(order).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Record the result of a finished game for the logged-in player.
#[utoipa::path(
    post,
    path = "/api/leaderboard/update",
    tag = "Leaderboard",
    request_body = ScoreSubmission,
    responses(
        (status = 200, description = "Score recorded", body = ScoreRecordedResponse),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal error", body = crate::error::ErrorResponse),
    )
)]
#[post("/api/leaderboard/update")]
pub async fn update_leaderboard(
    user: SessionUser,
    leaderboard: web::Data<LeaderboardService>,
    body: web::Json<ScoreSubmission>,
) -> AppResult<HttpResponse> {
    leaderboard
        .record_score(user.0.principal, body.score, body.avg_speed)
        .await?;
    Ok(HttpResponse::Ok().json(ScoreRecordedResponse { status: "ok" }))
}

/// Configure leaderboard routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_leaderboard).service(update_leaderboard);
}
