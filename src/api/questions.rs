//! Question API handlers.

use actix_web::{HttpResponse, get, post, web};
use tracing::debug;

use crate::auth::PageSession;
use crate::models::{Question, VerifyRequest, VerifyResponse};
use crate::services::QuestionService;

/// Generate the next question for this session.
#[utoipa::path(
    get,
    path = "/api/questions/random",
    tag = "Questions",
    responses(
        (status = 200, description = "New question", body = Question),
        (status = 303, description = "Not logged in; redirect to /"),
    )
)]
#[get("/api/questions/random")]
pub async fn random_question(
    session: PageSession,
    questions: web::Data<QuestionService>,
) -> HttpResponse {
    let question = questions.issue(&session.0.session_id).await;
    HttpResponse::Ok().json(question)
}

/// Check an answer against this session's current question.
#[utoipa::path(
    post,
    path = "/api/questions/verify",
    tag = "Questions",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyResponse),
        (status = 303, description = "Not logged in; redirect to /"),
        (status = 400, description = "Malformed body", body = crate::error::ErrorResponse),
    )
)]
#[post("/api/questions/verify")]
pub async fn verify_answer(
    session: PageSession,
    questions: web::Data<QuestionService>,
    body: web::Json<VerifyRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    debug!(
        question_id = ?body.question_id,
        time_spent_ms = body.time_spent,
        "verifying answer"
    );

    let result = questions
        .verify(&session.0.session_id, body.question_id, body.answer)
        .await;
    HttpResponse::Ok().json(result)
}

/// Configure question routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(random_question).service(verify_answer);
}
