use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::types::AccessClaims;
use crate::shared::AppError;

/// Lifetime used when a caller doesn't pass one to [`TokenConfig::issue`]
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Configuration for JWT token operations
#[derive(Clone, Debug)]
pub struct TokenConfig {
    secret: SecretString,
    pub access_token_expiration: Duration,
}

impl TokenConfig {
    pub fn new(secret: SecretString, access_token_expiration: Duration) -> Self {
        Self {
            secret,
            access_token_expiration,
        }
    }

    /// Signs a token for `subject` that expires after `ttl` (15 minutes if `None`)
    #[instrument(skip(self, subject))]
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, AppError> {
        let ttl = ttl.unwrap_or_else(|| Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES));
        let exp = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| {
                debug!(ttl_seconds = ttl.num_seconds(), "Token expiry out of range");
                AppError::Internal
            })?
            .timestamp();

        debug!(
            ttl_seconds = ttl.num_seconds(),
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = AccessClaims {
            sub: subject.to_string(),
            exp,
        };

        encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::Internal
        })
    }

    /// Issues a login token with the configured access-token lifetime
    pub fn issue_access_token(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, Some(self.access_token_expiration))
    }

    /// Validates a JWT token and returns its subject
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        debug!("Decoding and validating JWT token");

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::InvalidToken(e.to_string())
        })?;

        // jsonwebtoken still accepts exp == now; a token is only valid strictly before exp.
        if claims.exp <= Utc::now().timestamp() {
            debug!(exp = claims.exp, "JWT token has expired");
            return Err(AppError::InvalidToken("token has expired".to_string()));
        }

        if claims.sub.is_empty() {
            debug!("JWT token has an empty subject");
            return Err(AppError::InvalidToken("missing subject".to_string()));
        }

        debug!(sub = %claims.sub, exp = claims.exp, "JWT token decoded successfully");
        Ok(claims.sub)
    }
}
