//! Application wiring: shared state and route registration.

use actix_files::Files;
use actix_web::web;
use std::sync::Arc;
use tracing::info;

use crate::api;
use crate::auth::{CredentialHasher, SessionManager};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppResult, json_error_handler, query_error_handler};
use crate::services::{
    AvatarSource, CredentialStore, FactSource, GitHubEndpoints, GitHubProvider, IdentityProvider,
    LeaderboardService, NumbersApiFacts, OAuthBridge, QuestionService, RandomUserAvatars,
};

/// External capabilities the services depend on.
pub struct Capabilities {
    pub avatars: Arc<dyn AvatarSource>,
    pub facts: Arc<dyn FactSource>,
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl Capabilities {
    /// Live HTTP sources configured from `config`.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let identity_provider =
            GitHubProvider::from_settings(&config.github_oauth, GitHubEndpoints::default())?
                .map(|p| Arc::new(p) as Arc<dyn IdentityProvider>);

        Ok(Self {
            avatars: Arc::new(RandomUserAvatars::new(&config.external.avatar_api_url)?),
            facts: Arc::new(NumbersApiFacts::new(&config.external.facts_api_url)?),
            identity_provider,
        })
    }
}

/// Shared application state, one instance per process.
#[derive(Clone)]
pub struct AppState {
    pub config: web::Data<Config>,
    pub pool: web::Data<DbPool>,
    pub sessions: web::Data<SessionManager>,
    pub credentials: web::Data<CredentialStore>,
    pub questions: web::Data<QuestionService>,
    pub leaderboard: web::Data<LeaderboardService>,
    pub oauth: web::Data<OAuthBridge>,
}

impl AppState {
    /// Build every service around one pool.
    pub fn new(config: Config, pool: DbPool, capabilities: Capabilities) -> AppResult<Self> {
        let hasher = CredentialHasher::new(config.password_cost)?;
        info!("Password hashing: {:?}", hasher);

        let sessions = SessionManager::new(&config.session);
        let credentials = CredentialStore::new(pool.clone(), hasher, capabilities.avatars);
        let questions = QuestionService::new(capabilities.facts);
        let leaderboard = LeaderboardService::new(pool.clone());
        let oauth = OAuthBridge::new(capabilities.identity_provider, pool.clone());

        if oauth.is_enabled() {
            info!("GitHub OAuth login enabled");
        }

        Ok(Self {
            config: web::Data::new(config),
            pool: web::Data::new(pool),
            sessions: web::Data::new(sessions),
            credentials: web::Data::new(credentials),
            questions: web::Data::new(questions),
            leaderboard: web::Data::new(leaderboard),
            oauth: web::Data::new(oauth),
        })
    }

    /// Register shared state, extractor error handlers and all routes.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.pool.clone())
            .app_data(self.sessions.clone())
            .app_data(self.credentials.clone())
            .app_data(self.questions.clone())
            .app_data(self.leaderboard.clone())
            .app_data(self.oauth.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .service(Files::new("/static", &self.config.static_dir).prefer_utf8(true))
            .configure(api::configure_routes);
    }
}
