//! Mental math quiz server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_web::{App, HttpServer};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use mental_math_lib::app::{AppState, Capabilities};
use mental_math_lib::config::{Config, defaults};
use mental_math_lib::db::DbPool;
use mental_math_lib::middleware::{RequestLogger, SecurityHeaders};
use secrecy::ExposeSecret;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, SESSION_KEY must be set to a random key of 32+ bytes");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Mental Math Quiz Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }
    if config.session.key.expose_secret() == defaults::DEV_SESSION_KEY {
        warn!("SESSION_KEY is the development default; sessions can be forged");
    }
    if !config.session.cookie_secure {
        warn!("Session cookies are issued without the Secure flag");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let bind_address = config.bind_address();
    let worker_count = if config.is_development() {
        2
    } else {
        num_cpus::get()
    };

    let state = match Capabilities::from_config(&config)
        .and_then(|capabilities| AppState::new(config, pool, capabilities))
    {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to build application state: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting server at http://{} ({} workers)",
        bind_address, worker_count
    );

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(SecurityHeaders)
            .wrap(RequestLogger)
            .configure(move |cfg| state.configure(cfg))
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
