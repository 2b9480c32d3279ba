/// VidTube Auth Service - HTTP entry point
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use auth_service::{
    config::Config,
    db::{MemoryUserStore, PgUserStore, UserStore, MIGRATOR},
    routes, telemetry, AppState,
};
use crypto_core::jwt::TokenIssuer;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration from environment")?;
    telemetry::init_tracing();

    tracing::info!(?config, "starting auth-service");

    let tokens =
        TokenIssuer::new(config.token_config()).context("Invalid token signing configuration")?;

    let store: Arc<dyn UserStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await
                .context("Failed to connect to database")?;
            MIGRATOR
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("database connection pool initialized");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory user store");
            Arc::new(MemoryUserStore::new())
        }
    };

    let state = AppState::new(store, tokens);
    let cors_origin = config.cors_origin.clone();
    let bind_address = config.bind_address();

    tracing::info!(address = %bind_address, "HTTP server listening");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors(&cors_origin))
            .wrap(TracingLogger::default())
            .configure(routes::configure(&state))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    Ok(())
}

/// Credentialed CORS. A wildcard origin is mirrored back per request,
/// since browsers reject `*` together with credentials.
fn cors(origin: &str) -> Cors {
    let cors = if origin == "*" {
        Cors::default().allow_any_origin()
    } else {
        Cors::default().allowed_origin(origin)
    };

    cors.allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
