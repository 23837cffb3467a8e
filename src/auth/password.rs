//! Password hashing with Argon2id.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::PasswordCost;
use crate::error::{AppError, AppResult};

/// Password hasher with a tunable cost.
///
/// Hashes are PHC strings, so each one records the parameters it was made with
/// and stays verifiable after the configured cost changes.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
    /// Hash verified against when a username is unknown, so both failure paths
    /// do the same amount of work.
    dummy_hash: String,
}

impl CredentialHasher {
    /// Build a hasher for the given cost.
    pub fn new(cost: PasswordCost) -> AppResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| AppError::Internal(format!("Invalid password hashing cost: {}", e)))?;

        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash("not-a-real-password")?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a stored hash. Malformed hashes never verify.
    pub fn verify(&self, hash: &str, password: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Burn one verification for an unknown user. Always false.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(&self.dummy_hash, password);
        false
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish()
    }
}
