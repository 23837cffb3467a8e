//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_DATABASE_URL: &str = "sqlite://mental_math.db?mode=rwc";
    pub const DEV_SESSION_KEY: &str = "your-default-secret-key-change-this-in-production";
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const DEV_DB_MAX_CONNECTIONS: u32 = 8;
    pub const DEV_TEMPLATES_DIR: &str = "templates";
    pub const DEV_STATIC_DIR: &str = "static";
    pub const DEV_GITHUB_REDIRECT_URL: &str = "http://localhost:8080/auth/github/callback";
    pub const AVATAR_API_URL: &str = "https://randomuser.me/api/?inc=picture";
    pub const FACTS_API_URL: &str = "http://numbersapi.com";
}

/// Minimum accepted length of `SESSION_KEY` in bytes.
pub const MIN_SESSION_KEY_LEN: usize = 32;

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Argon2 cost parameters for password hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCost {
    /// Number of passes (t_cost)
    pub iterations: u32,
    /// Memory size in KiB (m_cost)
    pub memory_kib: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        Self {
            iterations: argon2::Params::DEFAULT_T_COST,
            memory_kib: argon2::Params::DEFAULT_M_COST,
        }
    }
}

/// GitHub OAuth application settings.
#[derive(Debug, Clone)]
pub struct GitHubOAuthSettings {
    /// Whether GitHub login is available (client id and secret both set)
    pub enabled: bool,
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub redirect_url: String,
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Key used to sign session tokens
    pub key: SecretString,
    /// Whether cookies carry the `Secure` flag
    pub cookie_secure: bool,
}

/// External data sources used for avatars and number facts.
#[derive(Debug, Clone)]
pub struct ExternalSettings {
    pub avatar_api_url: String,
    pub facts_api_url: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL (sqlite:// or postgres://)
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Directory holding the HTML pages
    pub templates_dir: PathBuf,
    /// Directory served under /static
    pub static_dir: PathBuf,
    /// Password hashing cost
    pub password_cost: PasswordCost,
    pub session: SessionSettings,
    pub github_oauth: GitHubOAuthSettings,
    pub external: ExternalSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development) every variable has a default.
    /// In production mode (RUST_ENV=production) the server will NOT start with
    /// the development `SESSION_KEY`.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `QUIZ_HOST`: Server host (default: 127.0.0.1)
    /// - `QUIZ_PORT`: Server port (default: 8080)
    /// - `DATABASE_URL`: sea-orm connection string (default: sqlite file)
    /// - `QUIZ_DB_MAX_CONNECTIONS`: Pool size (default: 8)
    /// - `SESSION_KEY`: Session signing key, at least 32 bytes (required in production)
    /// - `QUIZ_COOKIE_SECURE`: Secure cookie flag (default: true in production)
    /// - `QUIZ_HASH_ITERATIONS`: Argon2 passes (default: argon2 default)
    /// - `QUIZ_HASH_MEMORY_KIB`: Argon2 memory in KiB (default: argon2 default)
    /// - `QUIZ_TEMPLATES_DIR`: HTML pages directory (default: templates)
    /// - `QUIZ_STATIC_DIR`: Static assets directory (default: static)
    /// - `GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET`: OAuth app credentials
    /// - `GITHUB_REDIRECT_URL`: OAuth callback URL
    /// - `QUIZ_AVATAR_API_URL` / `QUIZ_FACTS_API_URL`: external sources
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("QUIZ_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("QUIZ_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("QUIZ_PORT must be a valid port number"))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| defaults::DEV_DATABASE_URL.to_string());

        let db_max_connections = env::var("QUIZ_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| defaults::DEV_DB_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue("QUIZ_DB_MAX_CONNECTIONS must be a valid number")
            })?;

        let session_key = SecretString::from(
            env::var("SESSION_KEY").unwrap_or_else(|_| defaults::DEV_SESSION_KEY.to_string()),
        );
        if session_key.expose_secret().len() < MIN_SESSION_KEY_LEN {
            return Err(ConfigError::InvalidValue(
                "SESSION_KEY must be at least 32 bytes long",
            ));
        }

        let cookie_secure = match env::var("QUIZ_COOKIE_SECURE") {
            Ok(v) => parse_bool(&v)
                .ok_or(ConfigError::InvalidValue("QUIZ_COOKIE_SECURE must be true or false"))?,
            Err(_) => environment.is_production(),
        };

        let default_cost = PasswordCost::default();
        let password_cost = PasswordCost {
            iterations: parse_u32_or("QUIZ_HASH_ITERATIONS", default_cost.iterations)?,
            memory_kib: parse_u32_or("QUIZ_HASH_MEMORY_KIB", default_cost.memory_kib)?,
        };

        let client_id = env::var("GITHUB_CLIENT_ID").ok().filter(|s| !s.is_empty());
        let client_secret = env::var("GITHUB_CLIENT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        let github_oauth = GitHubOAuthSettings {
            enabled: client_id.is_some() && client_secret.is_some(),
            client_id,
            client_secret,
            redirect_url: env::var("GITHUB_REDIRECT_URL")
                .unwrap_or_else(|_| defaults::DEV_GITHUB_REDIRECT_URL.to_string()),
        };

        let external = ExternalSettings {
            avatar_api_url: env::var("QUIZ_AVATAR_API_URL")
                .unwrap_or_else(|_| defaults::AVATAR_API_URL.to_string()),
            facts_api_url: env::var("QUIZ_FACTS_API_URL")
                .unwrap_or_else(|_| defaults::FACTS_API_URL.to_string()),
        };

        let config = Config {
            environment,
            host,
            port,
            database_url,
            db_max_connections,
            templates_dir: env::var("QUIZ_TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(defaults::DEV_TEMPLATES_DIR)),
            static_dir: env::var("QUIZ_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(defaults::DEV_STATIC_DIR)),
            password_cost,
            session: SessionSettings {
                key: session_key,
                cookie_secure,
            },
            github_oauth,
            external,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.session.key.expose_secret() == defaults::DEV_SESSION_KEY {
            errors.push(
                "SESSION_KEY is using the development default. Set a random key of at least 32 bytes."
                    .to_string(),
            );
        }

        if !self.session.cookie_secure {
            tracing::warn!("QUIZ_COOKIE_SECURE is disabled in production; cookies will be sent over plain HTTP");
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_u32_or(var: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(var) {
        Ok(v) => v
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidNumber(var)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid configuration value: {0} must be a valid number")]
    InvalidNumber(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
