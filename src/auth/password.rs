use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::shared::AppError;

/// Argon2id password hashing with a configurable work factor
#[derive(Clone, Debug)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Builds a hasher with explicit Argon2 cost parameters
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, argon2::Error> {
        Params::new(memory_kib, iterations, parallelism, None).map(Self::new)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Produces a salted PHC-format hash of the password
    #[instrument(skip(self, password))]
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                warn!(error = %e, "Failed to hash password");
                AppError::Internal
            })
    }

    /// Checks a password against a stored hash.
    ///
    /// Salt and cost come from the stored hash, not from `self`, so hashes
    /// written under an older work factor still verify. A malformed stored
    /// hash counts as a mismatch.
    #[instrument(skip_all)]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        let matches = self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();
        debug!(matches, "Password verification finished");
        matches
    }

    /// Hashes on the blocking pool so slow hashing doesn't stall the runtime
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                warn!(error = %e, "Password hashing task failed");
                AppError::Internal
            })?
    }

    pub async fn verify_blocking(&self, password: String, hash: SecretString) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, hash.expose_secret()))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Password verification task failed");
                false
            })
    }
}
