use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::SessionRepository;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store for development and tests.
///
/// Enforces the same email uniqueness and version checks as the Postgres
/// repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn contains(&self, id: &UserId) -> bool {
        self.users.read().await.contains_key(id)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        let mut stored = user.clone();
        stored.pending_password = None;
        users.insert(user.id, stored);

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn update(&self, mut user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;

        if stored.version != user.version {
            return Err(UserError::ConcurrentModification(user.id.to_string()));
        }

        user.version += 1;
        user.updated_at = Utc::now();
        user.pending_password = None;
        *stored = user.clone();

        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

/// Process-local session store for development and tests.
///
/// Bindings reference the user store the way the `sessions` table references
/// `users`: binding an unknown user fails with `NotFound`.
pub struct InMemorySessionRepository {
    users: Arc<InMemoryUserRepository>,
    sessions: RwLock<HashMap<UserId, Session>>,
}

impl InMemorySessionRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            users,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn bind(&self, session: Session) -> Result<(), UserError> {
        let mut sessions = self.sessions.write().await;

        if !self.users.contains(&session.user_id).await {
            return Err(UserError::NotFound(session.user_id.to_string()));
        }

        sessions.insert(session.user_id, session);
        Ok(())
    }

    async fn rotate(
        &self,
        user_id: &UserId,
        current_token: &str,
        next: Session,
    ) -> Result<bool, UserError> {
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(user_id) {
            Some(session) if session.refresh_token == current_token => {
                *session = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke(&self, user_id: &UserId) -> Result<(), UserError> {
        self.sessions.write().await.remove(user_id);
        Ok(())
    }
}
