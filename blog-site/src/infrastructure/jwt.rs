use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

/// Payload of the `session` cookie. `sid` points at a row in `sessions`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct SessionClaims {
    pub(crate) sid: String,
    pub(crate) exp: i64,
}

/// Payload of the `flash` cookie.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct FlashClaims {
    pub(crate) messages: Vec<String>,
    pub(crate) exp: i64,
}

/// Signs and verifies the cookies the site hands out, keyed by `SECRET_KEY`.
pub(crate) struct JwtService {
    pub(crate) secret: String,
    pub(crate) ttl_seconds: i64,
}

impl JwtService {
    const DEFAULT_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
    const FLASH_TTL_SECONDS: i64 = 5 * 60;

    pub(crate) fn new(secret: &str, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        JwtService {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    /// Unix timestamp at which a session started now expires.
    pub(crate) fn session_expiry(&self) -> i64 {
        (Utc::now() + Duration::seconds(self.ttl_seconds)).timestamp()
    }

    pub(crate) fn generate_session_token(&self, sid: &str, exp: i64) -> Result<String, JwtError> {
        self.sign(&SessionClaims {
            sid: sid.into(),
            exp,
        })
    }

    pub(crate) fn verify_session_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.verify(token)
    }

    pub(crate) fn generate_flash_token(&self, messages: Vec<String>) -> Result<String, JwtError> {
        let exp = (Utc::now() + Duration::seconds(Self::FLASH_TTL_SECONDS)).timestamp();
        self.sign(&FlashClaims { messages, exp })
    }

    pub(crate) fn verify_flash_token(&self, token: &str) -> Result<FlashClaims, JwtError> {
        self.verify(token)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 10;

        let token_data = decode::<T>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::Decode)?;

        Ok(token_data.claims)
    }
}
