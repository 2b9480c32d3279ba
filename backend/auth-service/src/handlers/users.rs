/// Account handlers: registration, current user, password change
use actix_web::{http::StatusCode, web, HttpResponse};

use crate::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{response::Empty, ApiResponse, ChangePasswordRequest, RegisterRequest},
    AppState,
};

/// Register endpoint handler
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = crate::models::PublicUser),
        (status = 400, description = "Missing or invalid fields", body = crate::error::ErrorBody),
        (status = 409, description = "Username or email taken", body = crate::error::ErrorBody)
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AuthError> {
    let user = state.accounts().register(&payload).await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        StatusCode::CREATED,
        user,
        "User registered successfully",
    )))
}

/// Current user endpoint handler
#[utoipa::path(
    get,
    path = "/api/v1/users/current-user",
    tag = "Users",
    responses(
        (status = 200, description = "The authenticated user", body = crate::models::PublicUser),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn current_user(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(user.0, "Current user fetched successfully"))
}

/// Change password endpoint handler
#[utoipa::path(
    post,
    path = "/api/v1/users/change-password",
    tag = "Users",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Missing fields or invalid old password", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AuthError> {
    state.accounts().change_password(user.0.id, &payload).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(Empty {}, "Password changed successfully")))
}
