use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for account operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Password derivation runs on the blocking pool so request tasks keep the
/// executor free.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Credential hasher and token codec
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    fn open_session(&self, user: User) -> Result<Session, UserError> {
        let result = self
            .authenticator
            .issue_token(&user.id.to_string(), Utc::now().timestamp())?;

        Ok(Session {
            user,
            access_token: result.access_token,
            expires_at: result.expires_at,
        })
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<Session, UserError> {
        if self.repository.find_by_email(&command.email).await?.is_some() {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let credential =
            tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
                .await
                .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            display_name: command.display_name,
            credential,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        self.open_session(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, UserError> {
        let Some(user) = self.repository.find_by_email(&command.email).await? else {
            tracing::debug!("Login attempt for unknown email");

            // Same derivation cost as a wrong password.
            let authenticator = Arc::clone(&self.authenticator);
            let password = command.password;
            tokio::task::spawn_blocking(move || {
                let decoy = authenticator.decoy_credential();
                authenticator.verify_password(password.expose(), &decoy)
            })
            .await
            .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?;

            return Err(UserError::InvalidCredentials);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let credential = user.credential.clone();
        let subject = user.id.to_string();
        let now = Utc::now().timestamp();

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.expose(), &credential, &subject, now)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
                UserError::InvalidCredentials
            }
            AuthenticationError::Token(err) => UserError::Token(err),
        })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(Session {
            user,
            access_token: result.access_token,
            expires_at: result.expires_at,
        })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use auth::AuthConfig;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Password;

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        let config = AuthConfig::from_secret("test_secret_key_at_least_32_bytes!")
            .unwrap()
            .with_password_iterations(1_000)
            .unwrap();
        Arc::new(Authenticator::new(&config))
    }

    fn email(value: &str) -> EmailAddress {
        EmailAddress::new_account(value.to_string()).unwrap()
    }

    fn password(value: &str) -> Password {
        Password::new(value.to_string()).unwrap()
    }

    fn stored_user(authenticator: &Authenticator, address: &str, plaintext: &str) -> User {
        User {
            id: UserId::new(),
            email: email(address),
            display_name: None,
            credential: authenticator.hash_password(plaintext),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestUserRepository::new();
        let authenticator = authenticator();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|user| user.email.as_str() == "alice@example.com")
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));

        let command = RegisterUserCommand::new(
            email("alice@example.com"),
            password("password123"),
            None,
        );

        let session = service.register(command).await.expect("Registration failed");

        // Credential derived from the submitted password, never stored in plaintext
        assert!(authenticator.verify_password("password123", &session.user.credential));
        assert!(!authenticator.verify_password("wrong", &session.user.credential));

        let subject = authenticator
            .validate_token(&session.access_token, Utc::now().timestamp())
            .expect("Issued token is invalid");
        assert_eq!(subject, session.user.id.to_string());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();
        let authenticator = authenticator();
        let existing = stored_user(&authenticator, "alice@example.com", "password123");

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), authenticator);

        let command = RegisterUserCommand::new(
            email("alice@example.com"),
            password("password456"),
            None,
        );

        let result = service.register(command).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_detected_by_repository() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_create().times(1).returning(|user| {
            Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()))
        });

        let service = UserService::new(Arc::new(repository), authenticator());

        let command = RegisterUserCommand::new(
            email("alice@example.com"),
            password("password123"),
            None,
        );

        let result = service.register(command).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repository = MockTestUserRepository::new();
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "alice@example.com", "password123");
        let user_id = user.id;

        repository
            .expect_find_by_email()
            .withf(|e| e.as_str() == "alice@example.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));

        let session = service
            .login(LoginCommand::new(
                email("alice@example.com"),
                password("password123"),
            ))
            .await
            .expect("Login failed");

        assert_eq!(session.user.id, user_id);
        assert_eq!(
            authenticator.validate_token(&session.access_token, Utc::now().timestamp()),
            Ok(user_id.to_string())
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "alice@example.com", "password123");

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), authenticator);

        let result = service
            .login(LoginCommand::new(email("alice@example.com"), password("wrong")))
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service
            .login(LoginCommand::new(
                email("nobody@example.com"),
                password("password123"),
            ))
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_costs_a_verification() {
        let mut repository = MockTestUserRepository::new();
        let config = AuthConfig::from_secret("test_secret_key_at_least_32_bytes!")
            .unwrap()
            .with_password_iterations(20_000)
            .unwrap();
        let authenticator = Arc::new(Authenticator::new(&config));

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));

        let started = std::time::Instant::now();
        authenticator.verify_password("password123", &authenticator.decoy_credential());
        let one_verification = started.elapsed();

        let started = std::time::Instant::now();
        let result = service
            .login(LoginCommand::new(
                email("nobody@example.com"),
                password("password123"),
            ))
            .await;
        let unknown_login = started.elapsed();

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
        assert!(
            unknown_login * 4 >= one_verification,
            "unknown email answered in {:?}, one verification takes {:?}",
            unknown_login,
            one_verification
        );
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
