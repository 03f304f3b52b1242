use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenPair;
use auth::TokenService;

use crate::domain::user::credentials::CredentialStore;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::EditProfileCommand;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::SessionRepository;
use crate::user::ports::UserRepository;

/// Domain service implementation for account authentication.
///
/// Concrete implementation of AuthServicePort with dependency injection.
pub struct AuthService<UR, SR>
where
    UR: UserRepository,
    SR: SessionRepository,
{
    credentials: CredentialStore<UR>,
    sessions: Arc<SR>,
    tokens: Arc<TokenService>,
}

impl<UR, SR> AuthService<UR, SR>
where
    UR: UserRepository,
    SR: SessionRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User persistence implementation
    /// * `sessions` - Session binding persistence implementation
    /// * `hasher` - Password hasher with the configured work factor
    /// * `tokens` - Access/refresh token issuer
    ///
    /// # Returns
    /// Configured auth service instance
    pub fn new(
        users: Arc<UR>,
        sessions: Arc<SR>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(users, hasher),
            sessions,
            tokens,
        }
    }

    async fn open_session(&self, user: User) -> Result<AuthenticatedUser, UserError> {
        let tokens = self.tokens.issue_pair(user.id)?;
        self.sessions
            .bind(Session::new(user.id, tokens.refresh_token.clone()))
            .await?;

        Ok(AuthenticatedUser { user, tokens })
    }

    async fn load(&self, id: &UserId) -> Result<User, UserError> {
        self.credentials
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<UR, SR> AuthServicePort for AuthService<UR, SR>
where
    UR: UserRepository,
    SR: SessionRepository,
{
    async fn register(&self, user: NewUser) -> Result<AuthenticatedUser, UserError> {
        let created = self.credentials.create(user).await?;
        let authenticated = self.open_session(created).await?;

        tracing::info!(user_id = %authenticated.user.id, "User registered");
        Ok(authenticated)
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthenticatedUser, UserError> {
        let Some(user) = self.credentials.find_by_email(&command.email).await? else {
            self.credentials
                .verify_against_dummy(&command.password)
                .await?;
            tracing::warn!("Login rejected: unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !self
            .credentials
            .verify_password(&user, &command.password)
            .await?
        {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(UserError::InvalidCredentials);
        }

        // The account can be removed between the lookup and the binding.
        let authenticated = self.open_session(user).await.map_err(|e| match e {
            UserError::NotFound(_) => UserError::InvalidCredentials,
            e => e,
        })?;

        tracing::info!(user_id = %authenticated.user.id, "User logged in");
        Ok(authenticated)
    }

    async fn reauth(&self, refresh_token: &str) -> Result<TokenPair, UserError> {
        let subject = self.tokens.verify_refresh(refresh_token).map_err(|e| {
            tracing::warn!(error = %e, "Refresh token rejected");
            UserError::InvalidRefreshToken
        })?;
        let user_id =
            UserId::from_string(&subject).map_err(|_| UserError::InvalidRefreshToken)?;

        if self.credentials.find_by_id(&user_id).await?.is_none() {
            tracing::warn!(user_id = %user_id, "Refresh token for a removed account");
            return Err(UserError::InvalidRefreshToken);
        }

        let tokens = self.tokens.issue_pair(user_id)?;
        let rotated = self
            .sessions
            .rotate(
                &user_id,
                refresh_token,
                Session::new(user_id, tokens.refresh_token.clone()),
            )
            .await?;

        if !rotated {
            tracing::warn!(user_id = %user_id, "Superseded refresh token presented");
            return Err(UserError::InvalidRefreshToken);
        }

        tracing::info!(user_id = %user_id, "Session refreshed");
        Ok(tokens)
    }

    async fn authenticate(&self, access_token: &str) -> Result<UserId, UserError> {
        let subject = self.tokens.verify_access(access_token).map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            UserError::Unauthorized("Invalid token".to_string())
        })?;
        let user_id = UserId::from_string(&subject)
            .map_err(|_| UserError::Unauthorized("Invalid token".to_string()))?;

        match self.credentials.find_by_id(&user_id).await? {
            Some(_) => Ok(user_id),
            None => Err(UserError::Unauthorized("User not found".to_string())),
        }
    }

    async fn logout(&self, id: &UserId) -> Result<(), UserError> {
        self.sessions.revoke(id).await?;

        tracing::info!(user_id = %id, "User logged out");
        Ok(())
    }

    async fn change_password(
        &self,
        id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError> {
        let mut user = self.load(id).await?;

        if !self
            .credentials
            .verify_password(&user, &command.old_password)
            .await?
        {
            tracing::warn!(user_id = %id, "Password change rejected: wrong old password");
            return Err(UserError::IncorrectPassword);
        }
        if command.old_password == command.new_password {
            return Err(UserError::SamePassword);
        }

        user.set_password(command.new_password);
        self.credentials.save(user).await?;
        self.sessions.revoke(id).await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn edit_profile(
        &self,
        id: &UserId,
        command: EditProfileCommand,
    ) -> Result<User, UserError> {
        if command.is_empty() {
            return Err(UserError::Validation(vec![
                "At least one of name, surname, or birthday must be provided".to_string(),
            ]));
        }

        let mut user = self.load(id).await?;

        if let Some(name) = command.name {
            user.name = name;
        }

        if let Some(surname) = command.surname {
            user.surname = surname;
        }

        if let Some(birthday) = command.birthday {
            user.birthday = birthday;
        }

        let updated = self.credentials.save(user).await?;

        tracing::info!(user_id = %id, "Profile updated");
        Ok(updated)
    }

    async fn get_profile(&self, id: &UserId) -> Result<User, UserError> {
        self.load(id).await
    }

    async fn remove_account(&self, id: &UserId) -> Result<(), UserError> {
        // User first: once it is gone no new binding can be created for it.
        self.credentials.delete_by_id(id).await?;
        self.sessions.revoke(id).await?;

        tracing::info!(user_id = %id, "Account removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth::TokenSettings;
    use chrono::NaiveDate;
    use chrono::Utc;
    use mockall::mock;
    use mockall::Sequence;

    use super::*;
    use crate::domain::user::models::Birthday;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::PersonName;
    use crate::domain::user::models::PlainPassword;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    mock! {
        pub TestSessionRepository {}

        #[async_trait]
        impl SessionRepository for TestSessionRepository {
            async fn bind(&self, session: Session) -> Result<(), UserError>;
            async fn rotate(&self, user_id: &UserId, current_token: &str, next: Session) -> Result<bool, UserError>;
            async fn revoke(&self, user_id: &UserId) -> Result<(), UserError>;
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(64, 1, 1).unwrap()
    }

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(TokenSettings::new(
            "test-access-secret-at-least-32-bytes",
            "test-refresh-secret-at-least-32-byte",
        )))
    }

    fn service(
        users: MockTestUserRepository,
        sessions: MockTestSessionRepository,
    ) -> AuthService<MockTestUserRepository, MockTestSessionRepository> {
        AuthService::new(Arc::new(users), Arc::new(sessions), hasher(), tokens())
    }

    fn password(value: &str) -> PlainPassword {
        PlainPassword::new("password", value.to_string()).unwrap()
    }

    fn stored_user(plain_password: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            name: PersonName::new("name", "John".to_string()).unwrap(),
            surname: PersonName::new("surname", "Doe".to_string()).unwrap(),
            birthday: Birthday::new(
                NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                now.date_naive(),
            )
            .unwrap(),
            email: EmailAddress::new("j@x.com".to_string()).unwrap(),
            password_hash: hasher().hash(plain_password).unwrap(),
            pending_password: None,
            version: 3,
            created_at: now,
            updated_at: now,
        }
    }

    fn new_user() -> NewUser {
        let user = stored_user("unused");
        NewUser {
            name: user.name,
            surname: user.surname,
            birthday: user.birthday,
            email: user.email,
            password: password("secret1"),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_binds_refresh_token() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        users
            .expect_find_by_email()
            .withf(|email| email == "j@x.com")
            .times(1)
            .returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|user| {
                user.password_hash.starts_with("$argon2id")
                    && user.password_hash != "secret1"
                    && user.pending_password.is_none()
            })
            .times(1)
            .returning(|user| Ok(user));
        sessions
            .expect_bind()
            .withf(|session| !session.refresh_token.is_empty())
            .times(1)
            .returning(|_| Ok(()));

        let tokens = tokens();
        let service = AuthService::new(
            Arc::new(users),
            Arc::new(sessions),
            hasher(),
            Arc::clone(&tokens),
        );

        let result = service.register(new_user()).await.unwrap();

        assert_eq!(result.user.email.as_str(), "j@x.com");
        let user_id = result.user.id.to_string();
        assert_eq!(tokens.verify_access(&result.tokens.access_token), Ok(user_id.clone()));
        assert_eq!(tokens.verify_refresh(&result.tokens.refresh_token), Ok(user_id));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        let existing = stored_user("secret1");
        users
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        users.expect_create().times(0);
        sessions.expect_bind().times(0);

        let result = service(users, sessions).register(new_user()).await;

        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_login_success_replaces_session() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        let user = stored_user("secret1");
        let user_id = user.id;
        users
            .expect_find_by_email()
            .withf(|email| email == "j@x.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        sessions
            .expect_bind()
            .withf(move |session| session.user_id == user_id)
            .times(1)
            .returning(|_| Ok(()));

        let command = LoginCommand {
            email: " J@X.com ".to_string(),
            password: password("secret1"),
        };
        let result = service(users, sessions).login(command).await.unwrap();

        assert_eq!(result.user.id, user_id);
        assert!(!result.tokens.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        let user = stored_user("secret1");
        users
            .expect_find_by_email()
            .withf(|email| email == "j@x.com")
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_find_by_email()
            .withf(|email| email != "j@x.com")
            .returning(|_| Ok(None));
        sessions.expect_bind().times(0);

        let service = service(users, sessions);

        let wrong_password = service
            .login(LoginCommand {
                email: "j@x.com".to_string(),
                password: password("wrong-password"),
            })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(LoginCommand {
                email: "nobody@x.com".to_string(),
                password: password("secret1"),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_reauth_rotates_bound_token() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        let user = stored_user("secret1");
        let user_id = user.id;
        let tokens = tokens();
        let presented = tokens.issue_refresh_token(user_id).unwrap();
        let expected = presented.clone();

        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        sessions
            .expect_rotate()
            .withf(move |id, current, next| {
                *id == user_id && current == expected && next.refresh_token != expected
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        let service = AuthService::new(
            Arc::new(users),
            Arc::new(sessions),
            hasher(),
            Arc::clone(&tokens),
        );

        let pair = service.reauth(&presented).await.unwrap();

        assert_ne!(pair.refresh_token, presented);
        assert_eq!(
            tokens.verify_access(&pair.access_token),
            Ok(user_id.to_string())
        );
    }

    #[tokio::test]
    async fn test_reauth_rejects_superseded_token() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        let user = stored_user("secret1");
        let tokens = tokens();
        let presented = tokens.issue_refresh_token(user.id).unwrap();

        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        sessions
            .expect_rotate()
            .times(1)
            .returning(|_, _, _| Ok(false));

        let service = AuthService::new(Arc::new(users), Arc::new(sessions), hasher(), tokens);

        let result = service.reauth(&presented).await;
        assert!(matches!(result, Err(UserError::InvalidRefreshToken)));
    }

    #[tokio::test]
    async fn test_reauth_rejects_access_token() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();
        users.expect_find_by_id().times(0);
        sessions.expect_rotate().times(0);

        let tokens = tokens();
        let access = tokens.issue_access_token(UserId::new()).unwrap();
        let service = AuthService::new(Arc::new(users), Arc::new(sessions), hasher(), tokens);

        let result = service.reauth(&access).await;
        assert!(matches!(result, Err(UserError::InvalidRefreshToken)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_removed_account() {
        let mut users = MockTestUserRepository::new();
        let sessions = MockTestSessionRepository::new();
        users.expect_find_by_id().times(1).returning(|_| Ok(None));

        let tokens = tokens();
        let access = tokens.issue_access_token(UserId::new()).unwrap();
        let service = AuthService::new(Arc::new(users), Arc::new(sessions), hasher(), tokens);

        let result = service.authenticate(&access).await;
        assert!(matches!(result, Err(UserError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_change_password_rehashes_and_revokes_session() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        let user = stored_user("secret1");
        let user_id = user.id;
        let old_hash = user.password_hash.clone();
        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_update()
            .withf(move |user| {
                user.password_hash != old_hash
                    && user.pending_password.is_none()
                    && hasher().verify("new-secret", &user.password_hash).unwrap()
            })
            .times(1)
            .returning(|user| Ok(user));
        sessions
            .expect_revoke()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(|_| Ok(()));

        let command = ChangePasswordCommand {
            old_password: password("secret1"),
            new_password: password("new-secret"),
        };

        assert!(service(users, sessions)
            .change_password(&user_id, command)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_change_password_wrong_old_password() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        let user = stored_user("secret1");
        let user_id = user.id;
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_update().times(0);
        sessions.expect_revoke().times(0);

        let command = ChangePasswordCommand {
            old_password: password("not-it"),
            new_password: password("new-secret"),
        };

        let result = service(users, sessions)
            .change_password(&user_id, command)
            .await;
        assert!(matches!(result, Err(UserError::IncorrectPassword)));
    }

    #[tokio::test]
    async fn test_change_password_same_password() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        let user = stored_user("secret1");
        let user_id = user.id;
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_update().times(0);
        sessions.expect_revoke().times(0);

        let command = ChangePasswordCommand {
            old_password: password("secret1"),
            new_password: password("secret1"),
        };

        let result = service(users, sessions)
            .change_password(&user_id, command)
            .await;
        assert!(matches!(result, Err(UserError::SamePassword)));
    }

    #[tokio::test]
    async fn test_edit_profile_updates_only_supplied_fields() {
        let mut users = MockTestUserRepository::new();
        let sessions = MockTestSessionRepository::new();

        let user = stored_user("secret1");
        let user_id = user.id;
        let old_hash = user.password_hash.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_update()
            .withf(move |user| {
                user.name.as_str() == "John"
                    && user.surname.as_str() == "Smith"
                    && user.birthday.to_string() == "1990-01-01"
                    && user.password_hash == old_hash
            })
            .times(1)
            .returning(|mut user| {
                user.version += 1;
                Ok(user)
            });

        let command = EditProfileCommand {
            surname: Some(PersonName::new("surname", "Smith".to_string()).unwrap()),
            ..Default::default()
        };

        let updated = service(users, sessions)
            .edit_profile(&user_id, command)
            .await
            .unwrap();

        assert_eq!(updated.surname.as_str(), "Smith");
        assert_eq!(updated.version, 4);
    }

    #[tokio::test]
    async fn test_edit_profile_requires_a_field() {
        let mut users = MockTestUserRepository::new();
        let sessions = MockTestSessionRepository::new();
        users.expect_find_by_id().times(0);

        let result = service(users, sessions)
            .edit_profile(&UserId::new(), EditProfileCommand::default())
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_edit_profile_user_gone() {
        let mut users = MockTestUserRepository::new();
        let sessions = MockTestSessionRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let command = EditProfileCommand {
            name: Some(PersonName::new("name", "Jane".to_string()).unwrap()),
            ..Default::default()
        };
        let result = service(users, sessions)
            .edit_profile(&UserId::new(), command)
            .await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_account_deletes_user_before_session() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();
        let mut order = Sequence::new();

        let user_id = UserId::new();
        users
            .expect_delete()
            .withf(move |id| *id == user_id)
            .times(1)
            .in_sequence(&mut order)
            .returning(|_| Ok(()));
        sessions
            .expect_revoke()
            .withf(move |id| *id == user_id)
            .times(1)
            .in_sequence(&mut order)
            .returning(|_| Ok(()));

        assert!(service(users, sessions)
            .remove_account(&user_id)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_remove_account_missing_user_keeps_sessions_untouched() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        users
            .expect_delete()
            .times(1)
            .returning(|id| Err(UserError::NotFound(id.to_string())));
        sessions.expect_revoke().times(0);

        let result = service(users, sessions).remove_account(&UserId::new()).await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_login_after_concurrent_removal_is_rejected() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();

        let user = stored_user("secret1");
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        sessions
            .expect_bind()
            .times(1)
            .returning(|session| Err(UserError::NotFound(session.user_id.to_string())));

        let result = service(users, sessions)
            .login(LoginCommand {
                email: "j@x.com".to_string(),
                password: password("secret1"),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_email_is_verified_against_cached_dummy_hash() {
        let mut users = MockTestUserRepository::new();
        let mut sessions = MockTestSessionRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        sessions.expect_bind().times(0);

        let service = service(users, sessions);

        let result = service
            .login(LoginCommand {
                email: "nobody@x.com".to_string(),
                password: password("secret1"),
            })
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));

        let first = service.credentials.dummy_hash().await.unwrap().to_string();
        let second = service.credentials.dummy_hash().await.unwrap().to_string();
        assert!(first.starts_with("$argon2id$v=19$m=64,t=1,p=1$"));
        assert_eq!(first, second);
        assert!(!hasher().verify("secret1", &first).unwrap());
    }
}
