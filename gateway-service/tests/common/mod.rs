use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::AuthConfig;
use auth::Authenticator;
use axum::Router;
use gateway_service::domain::mail::errors::MailError;
use gateway_service::domain::mail::models::OutgoingEmail;
use gateway_service::domain::mail::ports::MailSender;
use gateway_service::domain::mail::service::MailService;
use gateway_service::domain::user::errors::UserError;
use gateway_service::domain::user::models::EmailAddress;
use gateway_service::domain::user::models::User;
use gateway_service::domain::user::models::UserId;
use gateway_service::domain::user::ports::UserRepository;
use gateway_service::domain::user::service::UserService;
use gateway_service::inbound::http::router::create_router;
use tokio::sync::RwLock;

pub const TEST_SECRET: &str = "test-secret-key-for-token-signing";

/// In-memory stand-in for the Postgres repository
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

impl InMemoryUserRepository {
    pub async fn remove(&self, id: &UserId) {
        self.users.write().await.remove(id);
    }
}

/// Mail sender that records messages instead of talking to a relay
#[derive(Default)]
pub struct RecordingMailSender {
    sent: Mutex<Vec<OutgoingEmail>>,
    failure: Option<MailError>,
}

impl RecordingMailSender {
    pub fn failing(error: MailError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Fully wired router backed by in-memory adapters
pub struct TestContext {
    pub router: Router,
    pub authenticator: Arc<Authenticator>,
    pub repository: Arc<InMemoryUserRepository>,
    pub mail_sender: Arc<RecordingMailSender>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_mail_sender(RecordingMailSender::default())
    }

    pub fn with_mail_sender(mail_sender: RecordingMailSender) -> Self {
        let config = AuthConfig::from_secret(TEST_SECRET)
            .expect("Invalid test secret")
            .with_password_iterations(1_000)
            .expect("Invalid iteration count");
        let authenticator = Arc::new(Authenticator::new(&config));

        let repository = Arc::new(InMemoryUserRepository::default());
        let mail_sender = Arc::new(mail_sender);

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));
        let mail_service = Arc::new(MailService::new(Arc::clone(&mail_sender)));

        let router = create_router(user_service, mail_service, Arc::clone(&authenticator));

        Self {
            router,
            authenticator,
            repository,
            mail_sender,
        }
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub repository: Arc<InMemoryUserRepository>,
    pub mail_sender: Arc<RecordingMailSender>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(TestContext::new()).await
    }

    pub async fn spawn_with(context: TestContext) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let router = context.router;

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            authenticator: context.authenticator,
            repository: context.repository,
            mail_sender: context.mail_sender,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register an account and return its session token
    pub async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/api/register")
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }
}
