use std::sync::Arc;

use account_service::domain::user::service::AuthService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemorySessionRepository;
use account_service::outbound::repositories::InMemoryUserRepository;
use auth::PasswordHasher;
use auth::TokenService;
use auth::TokenSettings;
use serde_json::json;
use serde_json::Value;

pub mod db;

pub const ACCESS_SECRET: &str = "test-access-secret-key-at-least-32-bytes";
pub const REFRESH_SECRET: &str = "test-refresh-secret-key-at-least-32-bytes";
pub const API_PREFIX: &str = "/api/auth";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
}

/// Tokens and id returned by a successful registration.
#[allow(dead_code)]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(token_settings()).await
    }

    /// Spawn the application with custom token lifetimes.
    pub async fn spawn_with(settings: TokenSettings) -> Self {
        Self::spawn_configured(settings, &[]).await
    }

    /// Spawn the application with a CORS allow-list.
    #[allow(dead_code)]
    pub async fn spawn_with_origins(origins: &[&str]) -> Self {
        let origins: Vec<String> = origins.iter().map(|o| o.to_string()).collect();
        Self::spawn_configured(token_settings(), &origins).await
    }

    async fn spawn_configured(settings: TokenSettings, allowed_origins: &[String]) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let users = Arc::new(InMemoryUserRepository::new());
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&users),
            Arc::new(InMemorySessionRepository::new(users)),
            PasswordHasher::with_params(64, 1, 1).expect("valid params"),
            Arc::new(TokenService::new(settings)),
        ));

        let router = create_router(auth_service, API_PREFIX, allowed_origins);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.address, API_PREFIX, path)
    }

    /// Helper to make GET request outside the API prefix
    pub fn get_root(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.put(&self.url(path)).bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(&self.url(path)).bearer_auth(token)
    }

    /// Register an account and return its tokens.
    pub async fn register(&self, email: &str, password: &str) -> RegisteredUser {
        let response = self
            .post("/register")
            .json(&registration(email, password))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        RegisteredUser {
            id: body["data"]["id"].as_str().unwrap().to_string(),
            email: body["data"]["email"].as_str().unwrap().to_string(),
            password: password.to_string(),
            access_token: body["data"]["accessToken"].as_str().unwrap().to_string(),
            refresh_token: body["data"]["refreshToken"].as_str().unwrap().to_string(),
        }
    }

    /// Log in and return the raw response.
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Exchange a refresh token and return the raw response.
    pub async fn reauth(&self, refresh_token: &str) -> reqwest::Response {
        self.post("/reauth")
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn token_settings() -> TokenSettings {
    TokenSettings::new(ACCESS_SECRET, REFRESH_SECRET)
}

pub fn registration(email: &str, password: &str) -> Value {
    json!({
        "name": "John",
        "surname": "Doe",
        "birthday": "1990-01-01",
        "email": email,
        "password": password,
        "confirmPassword": password
    })
}
