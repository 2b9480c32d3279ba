//! Access/refresh token issuing and verification for VidTube services
//!
//! Tokens are HS256 JWTs. Access and refresh tokens are signed with two
//! distinct secrets, so a refresh token can never pass as an access token
//! (and the other way around) even though both use the same algorithm.
//!
//! ## Usage
//!
//! The issuer is built once at startup from an explicit [`TokenConfig`] and
//! shared read-only afterwards:
//!
//! ```rust
//! use chrono::Duration;
//! use crypto_core::jwt::{TokenConfig, TokenIssuer, TokenSubject};
//! use uuid::Uuid;
//!
//! let issuer = TokenIssuer::new(TokenConfig {
//!     access_secret: "access-secret".into(),
//!     access_ttl: Duration::minutes(15),
//!     refresh_secret: "refresh-secret".into(),
//!     refresh_ttl: Duration::days(10),
//! })
//! .expect("valid config");
//!
//! let id = Uuid::new_v4();
//! let subject = TokenSubject { id, username: "alice", email: "a@x.io", full_name: "Alice" };
//! let token = issuer.issue_access(&subject).unwrap();
//! assert_eq!(issuer.decode_access(&token).unwrap().sub, id);
//! ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

pub const DEFAULT_ACCESS_TOKEN_EXPIRY_SECS: i64 = 24 * 3600;
pub const DEFAULT_REFRESH_TOKEN_EXPIRY_SECS: i64 = 10 * 24 * 3600;

/// Upper bound for either token lifetime
pub const MAX_TOKEN_EXPIRY_SECS: i64 = 365 * 24 * 3600;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("token configuration error: {0}")]
    Config(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err.to_string()),
        }
    }
}

pub type TokenResult<T> = std::result::Result<T, TokenError>;

// ============================================================================
// Data Structures
// ============================================================================

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims carried by a refresh token. Identity only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    /// Unique per token; two refresh tokens minted in the same second still differ
    pub jti: Uuid,
}

/// The identity a token is minted for
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub full_name: &'a str,
}

/// Token pair response structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signing secrets and lifetimes, fixed for the life of the process
#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub access_ttl: Duration,
    pub refresh_secret: String,
    pub refresh_ttl: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_secret", &"<redacted>")
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

// ============================================================================
// Issuer
// ============================================================================

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Mints and verifies access and refresh tokens
pub struct TokenIssuer {
    access: KeyPair,
    refresh: KeyPair,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenIssuer {
    /// Build an issuer from configuration
    ///
    /// ## Errors
    ///
    /// Returns [`TokenError::Config`] if either secret is empty or both
    /// secrets are identical.
    pub fn new(config: TokenConfig) -> TokenResult<Self> {
        if config.access_secret.is_empty() {
            return Err(TokenError::Config("access token secret is empty".into()));
        }
        if config.refresh_secret.is_empty() {
            return Err(TokenError::Config("refresh token secret is empty".into()));
        }
        if config.access_secret == config.refresh_secret {
            return Err(TokenError::Config(
                "access and refresh token secrets must differ".into(),
            ));
        }
        check_ttl("access", config.access_ttl)?;
        check_ttl("refresh", config.refresh_ttl)?;

        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            access: KeyPair::from_secret(&config.access_secret),
            refresh: KeyPair::from_secret(&config.refresh_secret),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            validation,
        })
    }

    /// Lifetime of access tokens, used for cookie max-age
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Generate a new access token
    pub fn issue_access(&self, subject: &TokenSubject<'_>) -> TokenResult<String> {
        self.issue_access_at(subject, Utc::now())
    }

    /// Generate an access token as if issued at `now`
    pub fn issue_access_at(
        &self,
        subject: &TokenSubject<'_>,
        now: DateTime<Utc>,
    ) -> TokenResult<String> {
        let claims = AccessClaims {
            sub: subject.id,
            username: subject.username.to_string(),
            email: subject.email.to_string(),
            full_name: subject.full_name.to_string(),
            iat: now.timestamp(),
            exp: expiry(now, self.access_ttl)?,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.access.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Generate a new refresh token
    pub fn issue_refresh(&self, subject: &TokenSubject<'_>) -> TokenResult<String> {
        self.issue_refresh_at(subject, Utc::now())
    }

    /// Generate a refresh token as if issued at `now`
    pub fn issue_refresh_at(
        &self,
        subject: &TokenSubject<'_>,
        now: DateTime<Utc>,
    ) -> TokenResult<String> {
        let claims = RefreshClaims {
            sub: subject.id,
            iat: now.timestamp(),
            exp: expiry(now, self.refresh_ttl)?,
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.refresh.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Generate both access and refresh tokens
    pub fn issue_pair(&self, subject: &TokenSubject<'_>) -> TokenResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(subject)?,
            refresh_token: self.issue_refresh(subject)?,
        })
    }

    /// Verify signature and expiry of an access token
    pub fn decode_access(&self, token: &str) -> TokenResult<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.access.decoding, &self.validation)?;
        Ok(data.claims)
    }

    /// Verify signature and expiry of a refresh token
    pub fn decode_refresh(&self, token: &str) -> TokenResult<RefreshClaims> {
        let data = decode::<RefreshClaims>(token, &self.refresh.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

fn check_ttl(kind: &str, ttl: Duration) -> TokenResult<()> {
    if ttl <= Duration::zero() || ttl > Duration::seconds(MAX_TOKEN_EXPIRY_SECS) {
        return Err(TokenError::Config(format!(
            "{kind} token lifetime must be between 1 and {MAX_TOKEN_EXPIRY_SECS} seconds"
        )));
    }
    Ok(())
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> TokenResult<i64> {
    now.checked_add_signed(ttl)
        .map(|exp| exp.timestamp())
        .ok_or_else(|| TokenError::Signing("token expiry out of range".into()))
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
