//! SeaORM entity definitions.

pub mod github_user;
pub mod score;
pub mod user;
