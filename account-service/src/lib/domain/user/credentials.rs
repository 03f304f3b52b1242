use std::sync::Arc;

use auth::PasswordHasher;
use chrono::Utc;
use tokio::sync::OnceCell;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::PlainPassword;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Secret hashed once to give unknown-email logins a hash to verify against.
const DUMMY_PASSWORD: &str = "account-service-unknown-email";

/// User persistence plus password hashing.
///
/// Argon2 work runs on the blocking thread pool so request dispatch is never
/// stalled behind a hash.
pub struct CredentialStore<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    hasher: PasswordHasher,
    dummy_hash: OnceCell<String>,
}

impl<UR> CredentialStore<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, hasher: PasswordHasher) -> Self {
        Self {
            repository,
            hasher,
            dummy_hash: OnceCell::new(),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.repository
            .find_by_email(&EmailAddress::normalize(email))
            .await
    }

    pub async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.repository.find_by_id(id).await
    }

    /// Hash the password and persist a new user.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    pub async fn create(&self, new_user: NewUser) -> Result<User, UserError> {
        if self
            .repository
            .find_by_email(new_user.email.as_str())
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(
                new_user.email.as_str().to_string(),
            ));
        }

        let password_hash = self.hash(new_user.password.as_str().to_string()).await?;
        let now = Utc::now();

        let user = User {
            id: UserId::new(),
            name: new_user.name,
            surname: new_user.surname,
            birthday: new_user.birthday,
            email: new_user.email,
            password_hash,
            pending_password: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        self.repository.create(user).await
    }

    /// Persist a loaded user, hashing the password only if it was changed.
    ///
    /// # Errors
    /// * `NotFound` - User was deleted meanwhile
    /// * `ConcurrentModification` - User was updated meanwhile
    pub async fn save(&self, mut user: User) -> Result<User, UserError> {
        if let Some(password) = user.pending_password.take() {
            user.password_hash = self.hash(password.as_str().to_string()).await?;
        }

        self.repository.update(user).await
    }

    pub async fn delete_by_id(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await
    }

    /// Check a candidate password against the stored hash.
    pub async fn verify_password(
        &self,
        user: &User,
        candidate: &PlainPassword,
    ) -> Result<bool, UserError> {
        self.verify(candidate, user.password_hash.clone()).await
    }

    /// Spend the same Argon2 work as a real check when no account matched,
    /// so response time does not reveal whether an email is registered.
    ///
    /// The outcome is always a mismatch and is discarded.
    pub async fn verify_against_dummy(&self, candidate: &PlainPassword) -> Result<(), UserError> {
        let hash = self.dummy_hash().await?.to_string();
        self.verify(candidate, hash).await.map(|_| ())
    }

    /// PHC string of the placeholder secret, hashed on first use with the
    /// configured work factor.
    pub(crate) async fn dummy_hash(&self) -> Result<&str, UserError> {
        self.dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD.to_string()))
            .await
            .map(String::as_str)
    }

    async fn verify(&self, candidate: &PlainPassword, hash: String) -> Result<bool, UserError> {
        let hasher = self.hasher.clone();
        let candidate = candidate.clone();

        tokio::task::spawn_blocking(move || hasher.verify(candidate.as_str(), &hash))
            .await
            .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
            .map_err(UserError::from)
    }

    async fn hash(&self, secret: String) -> Result<String, UserError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }
}
