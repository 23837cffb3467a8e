//! Domain models for the quiz server.

pub mod leaderboard;
pub mod question;
pub mod user;

// Re-export commonly used types
pub use leaderboard::{LeaderboardEntry, LeaderboardOrder, LeaderboardQuery, ScoreSubmission};
pub use question::{Operator, Question, VerifyRequest, VerifyResponse};
pub use user::{
    CredentialsRequest, CurrentUserResponse, GitHubIdentity, GitHubUserInfo, Identity, Principal,
    SessionClaims, User,
};
