/// Route table
use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use utoipa::OpenApi;

use crate::error::AuthError;
use crate::handlers;
use crate::middleware::JwtAuthMiddleware;
use crate::openapi::ApiDoc;
use crate::AppState;

/// Mount every route. Each gated resource is wrapped in [`JwtAuthMiddleware`]
/// individually, so unknown paths still fall through to 404.
pub fn configure(state: &AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    let gate = JwtAuthMiddleware::new(state.store.clone(), state.tokens.clone());

    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error))
            .route("/health", web::get().to(handlers::health_check))
            .route(ApiDoc::openapi_json_path(), web::get().to(openapi_json))
            .service(
                web::scope("/api/v1/users")
                    .route("/register", web::post().to(handlers::register))
                    .route("/login", web::post().to(handlers::login))
                    .route("/refresh-token", web::post().to(handlers::refresh_token))
                    .service(
                        web::resource("/logout")
                            .wrap(gate.clone())
                            .route(web::post().to(handlers::logout)),
                    )
                    .service(
                        web::resource("/current-user")
                            .wrap(gate.clone())
                            .route(web::get().to(handlers::current_user)),
                    )
                    .service(
                        web::resource("/change-password")
                            .wrap(gate)
                            .route(web::post().to(handlers::change_password)),
                    ),
            );
    }
}

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Malformed JSON bodies get the same error envelope as everything else
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AuthError::BadRequest(format!("Invalid request body: {}", err)).into()
}
