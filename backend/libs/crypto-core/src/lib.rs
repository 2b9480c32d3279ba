//! Shared cryptographic building blocks for VidTube backend services
//!
//! - `jwt`: access/refresh token issuing and verification

pub mod jwt;

pub use jwt::{
    AccessClaims, RefreshClaims, TokenConfig, TokenError, TokenIssuer, TokenPair, TokenResult,
    TokenSubject,
};
