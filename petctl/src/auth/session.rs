//! JWT session token creation and verification.
//!
//! Tokens are HS256-signed and carry only the subject and the issue/expiry instants. There is
//! no server-side session store and no revocation: a token is valid exactly when its signature
//! verifies under the process secret and the current time is before `exp`. Rotating the secret
//! invalidates every outstanding token; supporting overlap would need versioned secrets
//! selected by a `kid` header.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::Config, errors::Error as AppError, types::UserId};

/// JWT session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId, // Subject (user ID)
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration time
}

/// Why a presented token was rejected. Only ever logged; clients see one generic message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies session tokens with a secret fixed at startup.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: TimeDelta,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, lifetime: std::time::Duration) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Internal {
                operation: "create token service: secret_key is required".to_string(),
            });
        }
        let lifetime = TimeDelta::from_std(lifetime).map_err(|e| AppError::Internal {
            operation: format!("create token service: invalid lifetime: {e}"),
        })?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by hand after the signature, with no leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let secret = config.secret_key.as_deref().ok_or_else(|| AppError::Internal {
            operation: "JWT sessions: secret_key is required".to_string(),
        })?;
        Self::new(secret, config.auth.security.jwt_expiry)
    }

    pub fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }

    /// Create a token for `user_id`, valid from now for the configured lifetime
    pub fn issue(&self, user_id: UserId) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = SessionClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| AppError::Internal {
            operation: format!("create JWT: {e}"),
        })
    }

    /// Verify a token and return its subject
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Signature first, then expiry: a forged token is never reported as merely expired.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

        if now.timestamp() >= token_data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims.sub)
    }
}
