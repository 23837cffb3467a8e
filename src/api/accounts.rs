//! Account API handlers: registration, login, logout and the current user.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

use crate::auth::{SessionManager, SessionUser};
use crate::error::{AppError, AppResult};
use crate::models::{CredentialsRequest, CurrentUserResponse, Principal};
use crate::services::{CredentialStore, QuestionService};

fn require_complete(body: &CredentialsRequest) -> AppResult<()> {
    if body.is_complete() {
        Ok(())
    } else {
        Err(AppError::InvalidInput(
            "Username and password are required".to_string(),
        ))
    }
}

/// Create a local account.
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Accounts",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Missing username or password", body = crate::error::ErrorResponse),
        (status = 409, description = "Username already exists", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal error", body = crate::error::ErrorResponse),
    )
)]
#[post("/api/register")]
pub async fn register(
    credentials: web::Data<CredentialStore>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    require_complete(&body)?;
    credentials.register(&body.username, &body.password).await?;
    Ok(HttpResponse::Created().finish())
}

/// Log in with a local account and receive the session cookie.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Accounts",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set"),
        (status = 400, description = "Missing username or password", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
    )
)]
#[post("/api/login")]
pub async fn login(
    req: HttpRequest,
    credentials: web::Data<CredentialStore>,
    sessions: web::Data<SessionManager>,
    questions: web::Data<QuestionService>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    require_complete(&body)?;
    let user_id = credentials.validate(&body.username, &body.password).await?;

    // A previous session in this browser may still hold a challenge.
    if let Ok(previous) = sessions.authenticate(&req) {
        questions.forget(&previous.session_id).await;
    }

    let (identity, cookie) = sessions.create(Principal::Local(user_id), &body.username)?;
    info!("User '{}' logged in (id={})", identity.username, user_id);

    Ok(HttpResponse::Ok().cookie(cookie).finish())
}

/// End the session and return to the start page.
///
/// Works without a session; the cookie is cleared either way.
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Accounts",
    responses(
        (status = 303, description = "Session cleared; redirect to /"),
    )
)]
#[post("/api/logout")]
pub async fn logout(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
    questions: web::Data<QuestionService>,
) -> HttpResponse {
    if let Ok(identity) = sessions.authenticate(&req) {
        questions.forget(&identity.session_id).await;
        info!("User '{}' logged out", identity.username);
    }

    HttpResponse::SeeOther()
        .cookie(sessions.destroy())
        .insert_header((header::LOCATION, "/"))
        .finish()
}

/// Username of the logged-in player.
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "Accounts",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse),
    )
)]
#[get("/api/user")]
pub async fn current_user(user: SessionUser) -> HttpResponse {
    HttpResponse::Ok().json(CurrentUserResponse {
        username: user.0.username,
    })
}

/// Configure account routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(current_user);
}
