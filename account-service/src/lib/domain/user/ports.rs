use async_trait::async_trait;
use auth::TokenPair;

use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::EditProfileCommand;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for account authentication operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create an account and open its first session.
    ///
    /// # Arguments
    /// * `user` - Validated registration fields
    ///
    /// # Returns
    /// Created user with a fresh access/refresh token pair
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, user: NewUser) -> Result<AuthenticatedUser, UserError>;

    /// Verify credentials and replace any existing session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    async fn login(&self, command: LoginCommand) -> Result<AuthenticatedUser, UserError>;

    /// Exchange the bound refresh token for a new token pair.
    ///
    /// The presented token must verify and be the one currently bound to the
    /// account; the binding then moves to the new refresh token.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Token invalid, expired, superseded or account gone
    async fn reauth(&self, refresh_token: &str) -> Result<TokenPair, UserError>;

    /// Resolve a bearer access token to an existing account.
    ///
    /// # Errors
    /// * `Unauthorized` - Token invalid or expired, or the account no longer exists
    async fn authenticate(&self, access_token: &str) -> Result<UserId, UserError>;

    /// Clear the session of an account.
    async fn logout(&self, id: &UserId) -> Result<(), UserError>;

    /// Replace the password and clear the session.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `IncorrectPassword` - Old password does not match
    /// * `SamePassword` - New password equals the old one
    async fn change_password(
        &self,
        id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError>;

    /// Update the supplied profile fields.
    ///
    /// # Errors
    /// * `Validation` - No field supplied
    /// * `NotFound` - User does not exist
    /// * `ConcurrentModification` - Record changed between read and write
    async fn edit_profile(
        &self,
        id: &UserId,
        command: EditProfileCommand,
    ) -> Result<User, UserError>;

    /// Retrieve the account profile.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_profile(&self, id: &UserId) -> Result<User, UserError>;

    /// Delete the account and its session.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn remove_account(&self, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Arguments
    /// * `user` - User entity with an already hashed password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by normalised email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Write back a loaded user.
    ///
    /// Succeeds only if the stored `version` still equals `user.version`;
    /// the returned entity carries the incremented version.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `ConcurrentModification` - Stored version differs
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}

/// Storage of the refresh token bound to each account.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Bind a session, replacing whatever was bound before.
    async fn bind(&self, session: Session) -> Result<(), UserError>;

    /// Atomically replace the bound session only if it still holds `current_token`.
    ///
    /// # Returns
    /// `true` if the swap happened, `false` if another token (or none) is bound
    async fn rotate(
        &self,
        user_id: &UserId,
        current_token: &str,
        next: Session,
    ) -> Result<bool, UserError>;

    /// Remove the bound session. Succeeds when none exists.
    async fn revoke(&self, user_id: &UserId) -> Result<(), UserError>;
}
