use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::config;

/// Claims carried by an access token. The subject is the only claim this
/// service requires; everything else is owned by the issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Reasons a request fails authentication. All of these surface to the
/// client as 401; the distinction exists for logging.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer credentials supplied")]
    MissingCredentials,

    #[error("malformed Authorization header: {0}")]
    MalformedHeader(&'static str),

    #[error("token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("claims rejected: {0}")]
    InvalidClaims(&'static str),

    #[error("JWT secret not configured")]
    SecretNotConfigured,
}

/// Verifies token signature and expiry against a shared HMAC secret.
/// Built once; safe to share across concurrent requests.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Decode and verify a token, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

static VERIFIER: OnceLock<Option<TokenVerifier>> = OnceLock::new();

fn shared_verifier() -> Option<&'static TokenVerifier> {
    VERIFIER
        .get_or_init(|| {
            let secret = &config::config().security.jwt_secret;
            if secret.is_empty() {
                None
            } else {
                Some(TokenVerifier::new(secret))
            }
        })
        .as_ref()
}

/// Verify a token against the process-wide secret.
pub fn verify_token(token: &str) -> Result<Claims, AuthError> {
    let verifier = shared_verifier().ok_or(AuthError::SecretNotConfigured)?;
    verifier.verify(token)
}

/// Secondary claim checks applied after signature verification.
pub fn validate_claims(claims: &Claims) -> Result<(), AuthError> {
    if claims.sub.trim().is_empty() {
        return Err(AuthError::InvalidClaims("subject is empty"));
    }
    Ok(())
}
