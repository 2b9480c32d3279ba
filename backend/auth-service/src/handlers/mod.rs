/// HTTP request handlers (REST API)
use actix_web::cookie::{time::Duration as CookieDuration, Cookie};

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{login, logout, refresh_token, LoginData, TokenData};
pub use health::health_check;
pub use users::{change_password, current_user, register};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Session cookies are never readable from scripts and only travel over TLS
pub(crate) fn session_cookie(
    name: &'static str,
    value: String,
    ttl: chrono::Duration,
) -> Cookie<'static> {
    Cookie::build(name, value)
        .http_only(true)
        .secure(true)
        .path("/")
        .max_age(CookieDuration::seconds(ttl.num_seconds()))
        .finish()
}

/// Removal cookie with the same attributes as the one it replaces
pub(crate) fn cleared_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "")
        .http_only(true)
        .secure(true)
        .path("/")
        .finish();
    cookie.make_removal();
    cookie
}
