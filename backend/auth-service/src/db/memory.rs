/// In-process user store for local runs and tests
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserLookup, UserStore};
use crate::models::{NewUser, PublicUser, User};

/// Last write wins, same as the Postgres store: there is no compare-and-swap.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("users_username_key".to_string()));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("users_email_key".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar,
            cover_image: user.cover_image,
            password_hash: user.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_public_by_id(&self, id: Uuid) -> StoreResult<Option<PublicUser>> {
        Ok(self.users.read().await.get(&id).map(PublicUser::from))
    }

    async fn find_by_username_or_email(&self, lookup: &UserLookup) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| lookup.matches(u))
            .min_by_key(|u| u.created_at)
            .cloned())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.refresh_token = token;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
