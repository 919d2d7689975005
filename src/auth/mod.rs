use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Token claims. `email` is the identity checked by email-scoped routes;
/// every other caller-supplied field rides along in `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid token payload: {0}")]
    InvalidPayload(String),
}

/// Signs and verifies HS256 bearer tokens with the server-held secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("expiry", &self.expiry).finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, expiry_secs: i64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::seconds(expiry_secs),
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(&config.access_token_secret, config.token_expiry_secs)
    }

    /// Sign an arbitrary JSON object. No credential check happens here:
    /// whoever supplies the payload decides the identity it asserts.
    /// `exp` and `iat` are always set by the service.
    pub fn issue(&self, mut payload: Map<String, Value>) -> Result<String, TokenError> {
        let email = match payload.remove("email") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                return Err(TokenError::InvalidPayload(format!("email must be a string, got {}", other)));
            }
        };
        payload.remove("exp");
        payload.remove("iat");

        let now = Utc::now();
        let claims = Claims {
            email,
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
            payload,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::TokenGeneration(e.to_string()))
    }

    /// Check signature and expiry, returning the embedded claims. Registered
    /// claims the caller chose to sign (`aud`, `iss`, `sub`, `nbf`) are
    /// carried through untouched; only `exp` is enforced.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))
    }

    pub fn expiry_secs(&self) -> i64 {
        self.expiry.num_seconds()
    }
}
