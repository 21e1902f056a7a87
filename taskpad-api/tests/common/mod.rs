/// Common test utilities for integration tests
///
/// Every test gets its own in-memory store, a router over it, one
/// registered user and a valid access token for that user.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use taskpad_api::app::{build_router, AppState};
use taskpad_api::config::Config;
use taskpad_shared::auth::jwt;
use taskpad_shared::models::user::{CreateUser, User};
use taskpad_shared::store::{MemoryStore, Store, StoreTx};
use taskpad_shared::tasks::operations::{add_task, AddTask};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-characters";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: MemoryStore,
    pub app: Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    pub async fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://unused/taskpad_test".to_string()),
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            _ => None,
        })
        .expect("test config");

        let store = MemoryStore::new();
        let app = build_router(AppState::new(store.clone(), config.clone()));

        let (user, jwt_token) = insert_user(&store, &config, "Test").await;

        TestContext {
            store,
            app,
            config,
            user,
            jwt_token,
        }
    }

    /// Inserts another password-less user and returns it with an access token
    pub async fn create_user(&self, first_name: &str) -> (User, String) {
        insert_user(&self.store, &self.config, first_name).await
    }

    /// Creates a task for the test user directly through the operations layer
    pub async fn seed_task(&self, title: &str, description: Option<&str>) -> Uuid {
        add_task(
            &self.store,
            self.user.id,
            AddTask {
                title: title.to_string(),
                description: description.map(str::to_string),
                ..Default::default()
            },
        )
        .await
        .expect("seed task")
        .task
        .id
    }

    /// Sends a request as the test user
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request_with(method, uri, Some(&self.jwt_token), body).await
    }

    /// Sends a request with an optional bearer token
    pub async fn request_with(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

async fn insert_user(store: &MemoryStore, config: &Config, first_name: &str) -> (User, String) {
    let user = User::new(CreateUser {
        email: format!("test-{}@example.com", Uuid::new_v4()),
        password_hash: None,
        first_name: Some(first_name.to_string()),
        last_name: None,
    });

    let mut tx = store.begin().await.expect("begin");
    tx.insert_user(&user).await.expect("insert user");
    tx.commit().await.expect("commit");

    let token = jwt::issue_token_pair(user.id, &config.jwt.secret)
        .expect("issue tokens")
        .access_token;
    (user, token)
}
