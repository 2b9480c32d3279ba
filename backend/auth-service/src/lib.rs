// VidTube auth service library

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod security;
pub mod services;
pub mod telemetry;


pub use config::Config;
pub use error::{AuthError, Result};

use std::sync::Arc;

use crypto_core::jwt::TokenIssuer;
use db::UserStore;
use services::{AccountService, SessionService};

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
        }
    }

    pub fn sessions(&self) -> SessionService {
        SessionService::new(self.store.clone(), self.tokens.clone())
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.store.clone())
    }
}
