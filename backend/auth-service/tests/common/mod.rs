//! Shared helpers for HTTP-level tests
#![allow(dead_code)]

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use auth_service::db::MemoryUserStore;
use auth_service::AppState;
use chrono::Duration;
use crypto_core::jwt::{TokenConfig, TokenIssuer};
use serde_json::{json, Value};

pub const PASSWORD: &str = "SecurePass123!";

pub fn token_config() -> TokenConfig {
    TokenConfig {
        access_secret: "integration-access-secret".to_string(),
        access_ttl: Duration::minutes(15),
        refresh_secret: "integration-refresh-secret".to_string(),
        refresh_ttl: Duration::days(10),
    }
}

/// App state over a fresh in-memory store; the returned store shares its data
pub fn app_state() -> (AppState, MemoryUserStore) {
    let store = MemoryUserStore::new();
    let issuer = TokenIssuer::new(token_config()).expect("valid token config");
    (AppState::new(Arc::new(store.clone()), issuer), store)
}

pub fn register_body(username: &str, email: &str) -> Value {
    json!({
        "fullName": "Integration User",
        "email": email,
        "username": username,
        "password": PASSWORD,
        "avatar": "https://cdn.example.com/avatars/default.png",
    })
}

pub fn response_cookie(resp: &ServiceResponse, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}
