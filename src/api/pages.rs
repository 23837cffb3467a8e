//! HTML pages. Templates are served as-is from the templates directory.

use actix_files::NamedFile;
use actix_web::{Result as ActixResult, get, web};

use crate::auth::PageSession;
use crate::config::Config;

async fn page(config: &Config, name: &str) -> ActixResult<NamedFile> {
    Ok(NamedFile::open_async(config.templates_dir.join(name)).await?)
}

#[get("/")]
pub async fn index(config: web::Data<Config>) -> ActixResult<NamedFile> {
    page(&config, "index.html").await
}

#[get("/register")]
pub async fn register_page(config: web::Data<Config>) -> ActixResult<NamedFile> {
    page(&config, "register.html").await
}

#[get("/game")]
pub async fn game(_session: PageSession, config: web::Data<Config>) -> ActixResult<NamedFile> {
    page(&config, "game.html").await
}

#[get("/leaderboard-page")]
pub async fn leaderboard_page(
    _session: PageSession,
    config: web::Data<Config>,
) -> ActixResult<NamedFile> {
    page(&config, "leaderboard.html").await
}

/// Configure page routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(register_page)
        .service(game)
        .service(leaderboard_page);
}
