//! JWT token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use statboard_db::Role;
use std::str::FromStr;
use tracing::debug;

use crate::error::AuthError;

/// Default session lifetime
pub const DEFAULT_TOKEN_VALIDITY_HOURS: i64 = 24;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User role at issue time
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Numeric user ID carried in `sub`
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Signing configuration, fixed at deployment time
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub validity: Duration,
}

impl TokenConfig {
    /// HS256 with the default 24 hour validity window
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            validity: Duration::hours(DEFAULT_TOKEN_VALIDITY_HOURS),
        }
    }

    /// Parse an algorithm name such as `"HS512"`; only HMAC variants are accepted
    pub fn with_algorithm(mut self, name: &str) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(name)
            .map_err(|_| AuthError::UnsupportedAlgorithm(name.to_string()))?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::UnsupportedAlgorithm(name.to_string()));
        }
        self.algorithm = algorithm;
        Ok(self)
    }

    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validity: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm: config.algorithm,
            validity: config.validity,
        }
    }

    /// Session lifetime handed to clients
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user_id: i64, role: Role) -> Result<String, AuthError> {
        self.generate_token_at(user_id, role, Utc::now())
    }

    /// Generate a token as if issued at `now`
    pub fn generate_token_at(
        &self,
        user_id: i64,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = now + self.validity;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Generating token for user: {}", user_id);

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate a JWT token and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validate a token against the clock reading `now`
    ///
    /// A token is valid strictly before its `exp` instant; there is no leeway.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        // Expiry is checked below against the supplied clock
        validation.validate_exp = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::InvalidToken
        })?;

        if now.timestamp() >= token_data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}
