/// Access-token issuance and verification for the social-api backend
///
/// Tokens are HS256 JWTs signed with a server-held secret. The key material is
/// loaded once at startup into a [`JwtKeys`] value which is then shared
/// (usually behind an `Arc`) with every component that issues or checks tokens.
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::JwtKeys;
///
/// let keys = JwtKeys::new("a-long-random-secret-loaded-from-config", 900);
/// let token = keys.issue(42).expect("issue token");
/// assert_eq!(keys.verify(&token).expect("verify token"), 42);
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default access token lifetime (15 minutes)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Upper bound on access token lifetime (one year)
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;
const ACCESS_TOKEN_TYPE: &str = "access";

/// Token failures surfaced to callers
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JwtError {
    /// Signature mismatch, malformed structure, wrong algorithm or bad subject
    #[error("invalid token")]
    InvalidToken,

    /// Signature is valid but the current time is past `exp`
    #[error("token expired")]
    ExpiredToken,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// JWT claims carried by every access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id, decimal string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type, always "access"
    pub token_type: String,
}

/// Signing and verification keys derived from one symmetric secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Build keys from a secret and an access-token lifetime in seconds.
    ///
    /// Lifetimes beyond [`MAX_ACCESS_TOKEN_TTL_SECS`] (in either direction) are clamped.
    pub fn new(secret: &str, access_token_ttl_secs: i64) -> Self {
        let secs = access_token_ttl_secs.clamp(-MAX_ACCESS_TOKEN_TTL_SECS, MAX_ACCESS_TOKEN_TTL_SECS);
        Self::with_ttl(secret, Duration::seconds(secs))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Lifetime of tokens produced by [`JwtKeys::issue`]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed access token for `user_id`.
    pub fn issue(&self, user_id: i64) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| JwtError::Encoding("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Verify signature and expiry, returning the decoded claims.
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken,
            }
        })?;

        if data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(JwtError::InvalidToken);
        }

        Ok(data.claims)
    }

    /// Verify a token and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<i64, JwtError> {
        let claims = self.decode(token)?;
        claims.sub.parse().map_err(|_| JwtError::InvalidToken)
    }
}
