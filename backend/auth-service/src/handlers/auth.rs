/// Session handlers: login, refresh-token rotation, logout
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use super::{cleared_cookie, session_cookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{response::Empty, ApiResponse, LoginRequest, PublicUser, RefreshTokenRequest},
    AppState,
};
use crypto_core::jwt::TokenPair;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenData {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

fn with_session_cookies<T: Serialize>(
    state: &AppState,
    tokens: &TokenPair,
    body: ApiResponse<T>,
) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(session_cookie(
            ACCESS_TOKEN_COOKIE,
            tokens.access_token.clone(),
            state.tokens.access_ttl(),
        ))
        .cookie(session_cookie(
            REFRESH_TOKEN_COOKIE,
            tokens.refresh_token.clone(),
            state.tokens.refresh_ttl(),
        ))
        .json(body)
}

/// Login endpoint handler
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "Session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "User logged in, session cookies set", body = LoginData),
        (status = 400, description = "Missing identifier or password", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid password", body = crate::error::ErrorBody),
        (status = 404, description = "User not found", body = crate::error::ErrorBody)
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    let outcome = state.sessions().login(&payload).await?;

    let body = ApiResponse::ok(
        LoginData {
            user: outcome.user,
            access_token: outcome.tokens.access_token.clone(),
            refresh_token: outcome.tokens.refresh_token.clone(),
        },
        "User logged in successfully",
    );
    Ok(with_session_cookies(&state, &outcome.tokens, body))
}

/// Refresh token endpoint handler
///
/// The `refreshToken` cookie wins over the JSON body field.
#[utoipa::path(
    post,
    path = "/api/v1/users/refresh-token",
    tag = "Session",
    request_body(content = RefreshTokenRequest, description = "Optional when the refreshToken cookie is sent"),
    responses(
        (status = 200, description = "New token pair issued", body = TokenData),
        (status = 401, description = "Missing, invalid, expired or reused refresh token", body = crate::error::ErrorBody)
    )
)]
pub async fn refresh_token(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, AuthError> {
    let from_cookie = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    let presented =
        from_cookie.or_else(|| payload.and_then(|p| p.into_inner().refresh_token));

    let tokens = state.sessions().refresh(presented.as_deref()).await?;

    let body = ApiResponse::ok(TokenData::from(tokens.clone()), "Access token refreshed");
    Ok(with_session_cookies(&state, &tokens, body))
}

/// Logout endpoint handler
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    tag = "Session",
    responses(
        (status = 200, description = "Refresh token cleared, session cookies removed"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AuthError> {
    state.sessions().logout(user.0.id).await?;

    Ok(HttpResponse::Ok()
        .cookie(cleared_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(cleared_cookie(REFRESH_TOKEN_COOKIE))
        .json(ApiResponse::ok(Empty {}, "User logged out")))
}
