//! API endpoint modules.

pub mod accounts;
pub mod health;
pub mod leaderboard;
pub mod openapi;
pub mod pages;
pub mod questions;

pub use accounts::configure_routes as configure_account_routes;
pub use health::configure_health_routes;
pub use leaderboard::configure_routes as configure_leaderboard_routes;
pub use openapi::ApiDoc;
pub use pages::configure_routes as configure_page_routes;
pub use questions::configure_routes as configure_question_routes;

use actix_web::web;

/// Register every JSON API and page route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_account_routes)
        .configure(configure_question_routes)
        .configure(configure_leaderboard_routes)
        .configure(crate::services::configure_oauth_routes)
        .configure(configure_page_routes)
        .service(openapi::openapi_json);
}
