//! Bearer token encoding and decoding.
//!
//! Tokens are compact HMAC-SHA256 signed strings carrying the subject username,
//! role, numeric user id, and issued-at/expiry timestamps. The codec is
//! constructed once from configuration (signing secret + TTL) and shared
//! read-only across requests; issuance and validation are pure CPU work.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{api::models::users::Role, auth::AuthError, config::Config, errors::Error, types::UserId};

/// Claims embedded in a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Role held when the token was issued
    pub role: Role,
    /// Numeric account id
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl From<Claims> for crate::api::models::users::CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.sub,
            role: claims.role,
        }
    }
}

/// Signs and verifies bearer tokens with a symmetric key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Build a codec from application configuration. Errors if no signing
    /// secret is configured.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let secret = config.secret_key.as_ref().ok_or_else(|| Error::Internal {
            operation: "token signing: secret_key is required".to_string(),
        })?;
        Ok(Self::new(secret, config.auth.security.token_ttl))
    }

    /// Issue a token for the given identity, valid for the configured TTL.
    pub fn issue(&self, username: &str, role: Role, user_id: UserId) -> Result<String, Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            role,
            user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| Error::Internal {
            operation: format!("sign token: {e}"),
        })
    }

    /// Verify and decode a token.
    ///
    /// The signature is verified before anything else; a tampered token is
    /// rejected as [`AuthError::TokenSignatureInvalid`] even if it is also
    /// expired. Expiry is checked next, and structural problems surface as
    /// [`AuthError::TokenMalformed`].
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken
            | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm
            | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
            | jsonwebtoken::errors::ErrorKind::ImmatureSignature
            | jsonwebtoken::errors::ErrorKind::Base64(_)
            | jsonwebtoken::errors::ErrorKind::Json(_)
            | jsonwebtoken::errors::ErrorKind::Utf8(_) => AuthError::TokenMalformed,
            // Catch-all for any other error variants
            _ => AuthError::TokenMalformed,
        })?;

        Ok(token_data.claims)
    }
}
