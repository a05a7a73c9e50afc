use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresignError {
    #[error("Storage link has expired")]
    Expired,

    #[error("Storage link is not valid for this object")]
    WrongKey,

    #[error("Invalid storage token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct PresignClaims {
    key: String,
    exp: i64,
}

/// Issues and checks time-limited links to stored objects.
///
/// A link is `{public_url}/storage/{key}?token={jwt}` where the HS256 token
/// carries the object key and an expiry.
#[derive(Clone)]
pub struct UrlSigner {
    public_url: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl UrlSigner {
    #[must_use]
    pub fn new(public_url: &str, secret: &[u8], expiry_minutes: i64) -> Self {
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry: Duration::minutes(expiry_minutes),
        }
    }

    pub fn token(&self, key: &str) -> Result<String, PresignError> {
        self.token_until(key, (Utc::now() + self.expiry).timestamp())
    }

    fn token_until(&self, key: &str, exp: i64) -> Result<String, PresignError> {
        let claims = PresignClaims {
            key: key.to_string(),
            exp,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Full presigned URL for `key`.
    pub fn presign(&self, key: &str) -> Result<String, PresignError> {
        Ok(format!(
            "{}/storage/{key}?token={}",
            self.public_url,
            self.token(key)?
        ))
    }

    /// Checks signature, expiry and that the token was issued for `key`.
    pub fn verify(&self, key: &str, token: &str) -> Result<(), PresignError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.required_spec_claims = ["exp".to_string()].into();
        let data = decode::<PresignClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PresignError::Expired,
                _ => PresignError::InvalidToken(e),
            },
        )?;
        if data.claims.key != key {
            return Err(PresignError::WrongKey);
        }
        Ok(())
    }
}
