//! Best-effort external data sources: random avatars and number facts.
//!
//! Both are unreliable third-party services. Callers treat every error as
//! "no data" and carry on, so the traits exist mainly to let tests swap in
//! offline doubles.

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Timeout for avatar and fact requests.
pub const EXTERNAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Fact flavours offered by the numbers service.
const FACT_KINDS: [&str; 3] = ["math", "trivia", "year"];

/// External source failure.
#[derive(Debug, thiserror::Error)]
pub enum ExternalError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    BadResponse(String),

    #[error("source disabled")]
    Disabled,
}

/// Supplies avatar image URLs for new users.
#[async_trait]
pub trait AvatarSource: Send + Sync {
    async fn random_avatar(&self) -> Result<String, ExternalError>;
}

/// Supplies short trivia about a number.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn fact_about(&self, number: i32) -> Result<String, ExternalError>;
}

/// Build an HTTP client with a total timeout.
pub fn build_http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// Avatars from randomuser.me.
pub struct RandomUserAvatars {
    client: reqwest::Client,
    url: String,
}

impl RandomUserAvatars {
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client: build_http_client(EXTERNAL_TIMEOUT)?,
            url: url.into(),
        })
    }
}

#[derive(Deserialize)]
struct RandomUserResponse {
    #[serde(default)]
    results: Vec<RandomUserResult>,
}

#[derive(Deserialize)]
struct RandomUserResult {
    picture: RandomUserPicture,
}

#[derive(Deserialize)]
struct RandomUserPicture {
    thumbnail: String,
}

#[async_trait]
impl AvatarSource for RandomUserAvatars {
    async fn random_avatar(&self) -> Result<String, ExternalError> {
        let body: RandomUserResponse = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.results
            .into_iter()
            .next()
            .map(|r| r.picture.thumbnail)
            .ok_or_else(|| ExternalError::BadResponse("no avatar received".to_string()))
    }
}

/// Facts from numbersapi.com.
pub struct NumbersApiFacts {
    client: reqwest::Client,
    base_url: String,
}

impl NumbersApiFacts {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client: build_http_client(EXTERNAL_TIMEOUT)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FactSource for NumbersApiFacts {
    async fn fact_about(&self, number: i32) -> Result<String, ExternalError> {
        let kind = FACT_KINDS[rand::thread_rng().gen_range(0..FACT_KINDS.len())];
        let url = format!("{}/{}/{}", self.base_url, number, kind);

        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(text.trim().to_string())
    }
}

/// Avatar source that never answers.
pub struct NoAvatars;

#[async_trait]
impl AvatarSource for NoAvatars {
    async fn random_avatar(&self) -> Result<String, ExternalError> {
        Err(ExternalError::Disabled)
    }
}

/// Fact source that never answers.
pub struct NoFacts;

#[async_trait]
impl FactSource for NoFacts {
    async fn fact_about(&self, _number: i32) -> Result<String, ExternalError> {
        Err(ExternalError::Disabled)
    }
}

/// Fact source answering from a fixed template; `{n}` is replaced by the number.
pub struct FixedFacts(pub String);

#[async_trait]
impl FactSource for FixedFacts {
    async fn fact_about(&self, number: i32) -> Result<String, ExternalError> {
        Ok(self.0.replace("{n}", &number.to_string()))
    }
}

/// Avatar source answering with a fixed URL.
pub struct FixedAvatar(pub String);

#[async_trait]
impl AvatarSource for FixedAvatar {
    async fn random_avatar(&self) -> Result<String, ExternalError> {
        Ok(self.0.clone())
    }
}
