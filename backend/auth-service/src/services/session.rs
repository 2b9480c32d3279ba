/// Session lifecycle: login, refresh-token rotation and logout
///
/// A user holds at most one trusted refresh token. Login and refresh replace
/// it, logout clears it, and any presented refresh token that is not
/// byte-identical to the stored one is rejected.
use std::sync::Arc;

use crypto_core::jwt::{TokenError, TokenIssuer, TokenPair};
use uuid::Uuid;

use crate::db::{UserLookup, UserStore};
use crate::error::{AuthError, AuthResult};
use crate::models::user::normalize_identifier;
use crate::models::{LoginRequest, PublicUser};
use crate::security::password;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: PublicUser,
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenIssuer>,
}

impl SessionService {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenIssuer>) -> Self {
        Self { store, tokens }
    }

    pub async fn login(&self, request: &LoginRequest) -> AuthResult<LoginOutcome> {
        let lookup = UserLookup {
            username: non_blank(request.username.as_deref()),
            email: non_blank(request.email.as_deref()),
        };
        if lookup.is_empty() {
            return Err(AuthError::bad_request("Username or email is required"));
        }

        let candidate = match request.password.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(AuthError::bad_request("Password is required")),
        };

        let user = self
            .store
            .find_by_username_or_email(&lookup)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        if !password::verify_password(candidate, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "login rejected: invalid password");
            return Err(AuthError::unauthorized("Invalid password"));
        }

        let tokens = self.tokens.issue_pair(&user.subject())?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginOutcome {
            user: PublicUser::from(&user),
            tokens,
        })
    }

    pub async fn refresh(&self, presented: Option<&str>) -> AuthResult<TokenPair> {
        // Compared byte-for-byte with the stored token, so never trimmed
        let presented = match presented {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AuthError::unauthorized("Unauthorized request")),
        };

        let claims = self.tokens.decode_refresh(presented).map_err(|err| {
            tracing::warn!(error = %err, "refresh rejected: token did not verify");
            match err {
                TokenError::Expired => AuthError::unauthorized("Refresh token expired"),
                TokenError::Invalid(_) => AuthError::unauthorized("Invalid refresh token"),
                other => AuthError::from(other),
            }
        })?;

        let user = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AuthError::unauthorized("Invalid refresh token"))?;

        if !user.holds_refresh_token(presented) {
            tracing::warn!(user_id = %user.id, "refresh rejected: token expired or reused");
            return Err(AuthError::unauthorized("Refresh token is expired or used"));
        }

        let tokens = self.tokens.issue_pair(&user.subject())?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        tracing::info!(user_id = %user.id, "refresh token rotated");
        Ok(tokens)
    }

    /// Clearing an already cleared token is a no-op, so logout never fails
    /// for a user the gate has just resolved.
    pub async fn logout(&self, user_id: Uuid) -> AuthResult<()> {
        let found = self.store.set_refresh_token(user_id, None).await?;
        if !found {
            tracing::warn!(user_id = %user_id, "logout for a user that no longer exists");
        }
        tracing::info!(user_id = %user_id, "user logged out");
        Ok(())
    }

    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AuthResult<()> {
        if self
            .store
            .set_refresh_token(user_id, Some(token.to_string()))
            .await?
        {
            Ok(())
        } else {
            Err(AuthError::unauthorized("Invalid refresh token"))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(normalize_identifier).filter(|v| !v.is_empty())
}
