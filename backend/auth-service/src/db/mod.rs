/// User persistence
///
/// The auth core only needs a narrow surface from storage: lookups with or
/// without credentials, one insert, and two single-field updates that never
/// touch the rest of the record.
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, PublicUser, User};

pub mod memory;
pub mod users;

pub use memory::MemoryUserStore;
pub use users::{PgUserStore, MIGRATOR};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("duplicate value violates {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Login lookup. Matches a user whose username OR email equals a given value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserLookup {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserLookup {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }

    pub fn matches(&self, user: &User) -> bool {
        self.username.as_deref() == Some(user.username.as_str())
            || self.email.as_deref() == Some(user.email.as_str())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Projection without password and refresh token
    async fn find_public_by_id(&self, id: Uuid) -> StoreResult<Option<PublicUser>>;

    async fn find_by_username_or_email(&self, lookup: &UserLookup) -> StoreResult<Option<User>>;

    /// Replace (or clear, with `None`) the stored refresh token.
    /// Returns whether a user row was found.
    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> StoreResult<bool>;

    /// Replace the password hash. Returns whether a user row was found.
    async fn set_password(&self, id: Uuid, password_hash: String) -> StoreResult<bool>;
}
