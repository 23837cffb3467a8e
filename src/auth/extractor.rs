//! Actix-web extractors for session authentication.
//!
//! Two gates share one session check but fail differently:
//! - [`SessionUser`] answers `401` with a JSON error body.
//! - [`PageSession`] redirects the browser to `/` with `303 See Other`.

use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};
use tracing::debug;

use super::SessionManager;
use crate::error::ErrorResponse;
use crate::models::user::Identity;

/// Authentication error for JSON API extractors.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

/// Redirect issued by [`PageSession`] when no session is present.
#[derive(Debug)]
pub struct LoginRedirect;

impl std::fmt::Display for LoginRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "login required")
    }
}

impl ResponseError for LoginRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/"))
            .finish()
    }
}

fn resolve(req: &HttpRequest) -> Option<Identity> {
    let sessions = req.app_data::<web::Data<SessionManager>>()?;
    match sessions.authenticate(req) {
        Ok(identity) => Some(identity),
        Err(e) => {
            debug!(path = %req.path(), "session rejected: {}", e);
            None
        }
    }
}

/// Extractor that requires a session and answers `401` without one.
///
/// ```ignore
/// async fn handler(user: SessionUser) -> impl Responder {
///     // user.0 is the session identity
/// }
/// ```
pub struct SessionUser(pub Identity);

impl FromRequest for SessionUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map(SessionUser).ok_or_else(|| AuthError {
            message: "Not logged in".to_string(),
        }))
    }
}

/// Extractor that requires a session and redirects to `/` without one.
pub struct PageSession(pub Identity);

impl FromRequest for PageSession {
    type Error = LoginRedirect;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map(PageSession).ok_or(LoginRedirect))
    }
}
