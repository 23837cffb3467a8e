//! Business logic services.

pub mod credentials;
pub mod external;
pub mod github_oauth;
pub mod leaderboard;
pub mod questions;

pub use credentials::{CredentialError, CredentialStore};
pub use external::{AvatarSource, FactSource, NumbersApiFacts, RandomUserAvatars};
pub use github_oauth::{
    GitHubEndpoints, GitHubProvider, IdentityProvider, OAuthBridge, OAuthError,
    configure_routes as configure_oauth_routes,
};
pub use leaderboard::LeaderboardService;
pub use questions::QuestionService;
