use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
/// OpenAPI documentation for the VidTube auth service
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::handlers::{LoginData, TokenData};
use crate::models::{
    ChangePasswordRequest, LoginRequest, PublicUser, RefreshTokenRequest, RegisterRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VidTube Auth Service API",
        version = "0.1.0",
        description = "Registration, login, refresh-token rotation and logout for VidTube users. Session tokens are returned in the body and as HttpOnly cookies.",
        license(name = "MIT")
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::register,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh_token,
        crate::handlers::auth::logout,
        crate::handlers::users::current_user,
        crate::handlers::users::change_password,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        RefreshTokenRequest,
        ChangePasswordRequest,
        PublicUser,
        LoginData,
        TokenData,
        ErrorBody,
    )),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Users", description = "Registration and account management"),
        (name = "Session", description = "Login, token rotation and logout"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token; the accessToken cookie is also accepted"))
                        .build(),
                ),
            )
        }
    }
}

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}
