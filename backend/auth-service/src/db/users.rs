/// Postgres-backed user store
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserLookup, UserStore};
use crate::models::{NewUser, PublicUser, User};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unique constraint");
                return StoreError::Duplicate(constraint.to_string());
            }
        }
        StoreError::Backend(err.to_string())
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, full_name, avatar, cover_image, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING id, username, email, full_name, avatar, cover_image, password_hash, refresh_token, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar)
        .bind(&user.cover_image)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, full_name, avatar, cover_image, password_hash, refresh_token, \
             created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_public_by_id(&self, id: Uuid) -> StoreResult<Option<PublicUser>> {
        let user = sqlx::query_as::<_, PublicUser>(
            "SELECT id, username, email, full_name, avatar, cover_image, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username_or_email(&self, lookup: &UserLookup) -> StoreResult<Option<User>> {
        if lookup.is_empty() {
            return Ok(None);
        }

        // NULL binds never match, so an absent identifier simply drops out of the OR
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, full_name, avatar, cover_image, password_hash, refresh_token, \
             created_at, updated_at FROM users WHERE username = $1 OR email = $2 \
             ORDER BY created_at LIMIT 1",
        )
        .bind(&lookup.username)
        .bind(&lookup.email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(token)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
