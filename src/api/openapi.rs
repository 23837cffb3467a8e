//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get};
use utoipa::OpenApi;

use crate::{api, auth, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mental Math Quiz Server",
        version = "0.1.0",
        description = "Accounts, arithmetic questions and leaderboards for the mental math quiz"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Account endpoints
        api::accounts::register,
        api::accounts::login,
        api::accounts::logout,
        api::accounts::current_user,
        // Question endpoints
        api::questions::random_question,
        api::questions::verify_answer,
        // Leaderboard endpoints
        api::leaderboard::get_leaderboard,
        api::leaderboard::update_leaderboard,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            models::CredentialsRequest,
            models::CurrentUserResponse,
            models::Operator,
            models::Question,
            models::VerifyRequest,
            models::VerifyResponse,
            models::LeaderboardEntry,
            models::ScoreSubmission,
            api::leaderboard::ScoreRecordedResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Accounts", description = "Registration, login and logout"),
        (name = "Questions", description = "Question generation and answer checks"),
        (name = "Leaderboard", description = "Score submission and rankings")
    ),
    modifiers(&SessionCookieAddon)
)]
pub struct ApiDoc;

/// Add the session cookie security scheme.
struct SessionCookieAddon;

impl utoipa::Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Cookie(
                        utoipa::openapi::security::ApiKeyValue::new(
                            auth::session::SESSION_COOKIE,
                        ),
                    ),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document.
#[get("/api/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
