/// Account operations that share the user record with the session lifecycle
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::db::UserStore;
use crate::error::{AuthError, AuthResult};
use crate::models::{ChangePasswordRequest, NewUser, PublicUser, RegisterRequest};
use crate::security::password;

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Create a user without issuing any tokens
    pub async fn register(&self, request: &RegisterRequest) -> AuthResult<PublicUser> {
        let request = request.normalized();

        let required = [
            &request.full_name,
            &request.email,
            &request.username,
            &request.password,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AuthError::bad_request("All fields are required"));
        }
        // Upload is handled elsewhere; the avatar arrives as a hosted URL
        let avatar = request
            .avatar
            .clone()
            .ok_or_else(|| AuthError::bad_request("Avatar is required"))?;

        request
            .validate()
            .map_err(|e| AuthError::BadRequest(first_validation_message(&e)))?;
        password::validate_password_strength(&request.password)?;

        let password_hash = password::hash_password(&request.password)?;
        let new_user = NewUser {
            username: request.username,
            email: request.email,
            full_name: request.full_name,
            avatar: Some(avatar),
            cover_image: request.cover_image,
            password_hash,
        };

        let created = self.store.create(new_user).await?;

        // Re-read through the projection so the response matches what is stored
        let user = self
            .store
            .find_public_by_id(created.id)
            .await?
            .ok_or_else(|| {
                AuthError::Internal("Something went wrong while registering the user".to_string())
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: &ChangePasswordRequest,
    ) -> AuthResult<()> {
        if request.old_password.is_empty() || request.new_password.is_empty() {
            return Err(AuthError::bad_request(
                "Old password and new password are required",
            ));
        }

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::unauthorized("Invalid access token"))?;

        if !password::verify_password(&request.old_password, &user.password_hash) {
            tracing::warn!(user_id = %user_id, "password change rejected: old password mismatch");
            return Err(AuthError::bad_request("Invalid old password"));
        }

        password::validate_password_strength(&request.new_password)?;
        let password_hash = password::hash_password(&request.new_password)?;
        self.store.set_password(user_id, password_hash).await?;

        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }
}

fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input".to_string())
}
