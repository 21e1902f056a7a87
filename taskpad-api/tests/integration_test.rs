/// Integration tests for the Taskpad API
///
/// Requests go through the full router (auth layer, handlers, error
/// mapping, response headers) backed by the in-memory store.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::TestContext;
use serde_json::json;
use std::time::Duration;
use taskpad_shared::store::Store;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_reports_connected_store() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.request_with(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let ctx = TestContext::new().await;

    let response = ctx
        .app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.request_with(Method::GET, "/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = ctx
        .request_with(Method::GET, "/v1/tasks", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let ctx = TestContext::new().await;
    let pair = taskpad_shared::auth::jwt::issue_token_pair(ctx.user.id, common::TEST_SECRET).unwrap();

    let (status, _) = ctx
        .request_with(Method::GET, "/v1/tasks", Some(&pair.refresh_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx
        .request_with(
            Method::POST,
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": pair.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");

    let access = body["access_token"].as_str().unwrap().to_string();
    let (status, _) = ctx
        .request_with(Method::GET, "/v1/tasks", Some(&access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_then_login() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .request_with(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({
                "email": "Alice@Example.com",
                "password": "Str0ng!Pass",
                "first_name": "Alice"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());

    let (status, body) = ctx
        .request_with(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "email": "ALICE@example.com", "password": "Str0ng!Pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already exists");

    let (status, body) = ctx
        .request_with(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Str0ng!Pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"]["last_login_at"].is_string());

    let (status, body) = ctx
        .request_with(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Wr0ng!Pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_leaves_store_available_while_verifying() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .request_with(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "email": "carol@example.com", "password": "Str0ng!Pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": "carol@example.com", "password": "Str0ng!Pass" }).to_string(),
        ))
        .unwrap();
    let app = ctx.app.clone();
    let login = tokio::spawn(async move { app.oneshot(request).await.unwrap().status() });

    while !login.is_finished() {
        let tx = tokio::time::timeout(Duration::from_millis(50), ctx.store.begin()).await;
        assert!(tx.is_ok(), "store stayed locked during login");
        drop(tx);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    assert_eq!(login.await.unwrap(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_rejects_weak_password_and_bad_email() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .request_with(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "email": "bob@example.com", "password": "weak" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "password");

    let (status, body) = ctx
        .request_with(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "email": "not-an-email", "password": "Str0ng!Pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_login_without_password_account() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .request_with(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": ctx.user.email, "password": "Str0ng!Pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_get_and_update() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.request(Method::GET, "/v1/users/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Test");
    assert_eq!(body["theme_preference"], "dark");

    let (status, body) = ctx
        .request(
            Method::PUT,
            "/v1/users/me",
            Some(json!({ "bio": "Gardener", "theme_preference": "light" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "Gardener");
    assert_eq!(body["theme_preference"], "light");
    assert_eq!(body["first_name"], "Test");

    let (status, body) = ctx
        .request(
            Method::PUT,
            "/v1/users/me",
            Some(json!({ "theme_preference": "neon" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "theme_preference");
}

#[tokio::test]
async fn test_task_crud() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/tasks",
            Some(json!({
                "title": "  Buy groceries  ",
                "priority": "HIGH",
                "tags": "home, errands,"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Task 'Buy groceries' added successfully");
    assert_eq!(body["task"]["priority"], "high");
    assert_eq!(body["task"]["tags"], json!(["home", "errands"]));
    assert_eq!(body["task"]["status"], "pending");
    let id = body["task"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .request(
            Method::PUT,
            &format!("/v1/tasks/{}", id),
            Some(json!({ "title": "Buy vegetables", "tags": ["food"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "Buy vegetables");
    assert_eq!(body["task"]["priority"], "high");
    assert_eq!(body["task"]["tags"], json!(["food"]));

    let (status, body) = ctx.request(Method::GET, "/v1/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = ctx
        .request(Method::DELETE, &format!("/v1/tasks/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task_id"], id);

    let (status, body) = ctx
        .request(Method::DELETE, &format!("/v1/tasks/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

#[tokio::test]
async fn test_task_validation_errors() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .request(Method::POST, "/v1/tasks", Some(json!({ "title": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "Title cannot be empty");

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/tasks",
            Some(json!({ "title": "x", "priority": "urgent" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Priority must be 'low', 'medium', or 'high'");

    let (status, body) = ctx
        .request(Method::DELETE, "/v1/tasks/not-a-uuid", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid task ID format");

    assert!(ctx.store.snapshot_tasks(ctx.user.id).await.is_empty());
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let ctx = TestContext::new().await;
    ctx.seed_task("Water plants", None).await;
    let done = ctx.seed_task("Pay rent", None).await;

    let (status, _) = ctx
        .request(Method::POST, &format!("/v1/tasks/{}/toggle", done), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = ctx.request(Method::GET, "/v1/tasks?status=pending", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["tasks"][0]["title"], "Water plants");

    let (_, body) = ctx.request(Method::GET, "/v1/tasks?status=completed", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["tasks"][0]["title"], "Pay rent");

    let (_, body) = ctx.request(Method::GET, "/v1/tasks?status=deleted", None).await;
    assert_eq!(body["count"], 0);

    let (_, body) = ctx.request(Method::GET, "/v1/tasks?status=whatever", None).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["tasks"][0]["title"], "Pay rent");
}

#[tokio::test]
async fn test_toggle_by_text_and_ambiguity() {
    let ctx = TestContext::new().await;
    ctx.seed_task("Buy milk", None).await;
    ctx.seed_task("Buy bread", None).await;
    ctx.seed_task("Call dentist", Some("Ask about the cleaning")).await;

    let (status, body) = ctx
        .request(Method::POST, "/v1/tasks/CLEANING/toggle", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "Call dentist");
    assert_eq!(body["task"]["status"], "completed");
    assert_eq!(body["message"], "Task 'Call dentist' marked as completed");

    let (status, body) = ctx.request(Method::POST, "/v1/tasks/buy/toggle", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ambiguous_match");
    assert_eq!(
        body["message"],
        "Found multiple tasks matching 'buy'. Please provide the specific task ID to complete."
    );
    assert_eq!(body["candidates"].as_array().unwrap().len(), 2);
    assert!(body["candidates"][0].as_str().unwrap().starts_with("'Buy bread' (ID: "));

    let (status, body) = ctx.request(Method::POST, "/v1/tasks/laundry/toggle", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "Could not find a task with the description 'laundry'. Please provide the task ID or a more specific description to complete the task."
    );
}

#[tokio::test]
async fn test_foreign_task_is_forbidden() {
    let ctx = TestContext::new().await;
    let id = ctx.seed_task("Private task", None).await;
    let (_, other_token) = ctx.create_user("Other").await;

    let (status, body) = ctx
        .request_with(
            Method::PUT,
            &format!("/v1/tasks/{}", id),
            Some(&other_token),
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this task");

    let (status, _) = ctx
        .request_with(Method::DELETE, &format!("/v1/tasks/{}", id), Some(&other_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = ctx
        .request_with(Method::GET, "/v1/tasks", Some(&other_token), None)
        .await;
    assert_eq!(body["count"], 0);

    let tasks = ctx.store.snapshot_tasks(ctx.user.id).await;
    assert_eq!(tasks[0].title, "Private task");
}

#[tokio::test]
async fn test_delete_by_search() {
    let ctx = TestContext::new().await;
    let id = ctx.seed_task("Renew passport", None).await;
    ctx.seed_task("Book flights", None).await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/tasks/delete-by-search",
            Some(json!({ "search_text": "<task_id>" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/tasks/delete-by-search",
            Some(json!({ "search_term": "passport" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task_id"], id.to_string());
    assert_eq!(body["message"], "Task 'Renew passport' deleted successfully");

    let remaining = ctx.store.snapshot_tasks(ctx.user.id).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Book flights");
}

#[tokio::test]
async fn test_complete_pending() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .request(Method::POST, "/v1/tasks/complete-pending", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["message"], "No pending tasks to complete.");

    ctx.seed_task("One", None).await;
    ctx.seed_task("Two", None).await;

    let (status, body) = ctx
        .request(Method::POST, "/v1/tasks/complete-pending", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["message"], "Successfully completed 2 pending task(s).");

    let (_, body) = ctx.request(Method::GET, "/v1/tasks?status=pending", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_assistant_tools() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.request(Method::GET, "/v1/assistant/tools", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tools"].as_array().unwrap().len(), 7);

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/assistant/tools/call",
            Some(json!({
                "name": "add_task",
                "arguments": { "title": "Walk the dog", "tags": "pets" }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["tags"], json!(["pets"]));

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/assistant/tools/call",
            Some(json!({ "name": "toggle_complete", "arguments": { "id_or_text": "dog" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["status"], "completed");

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/assistant/tools/call",
            Some(json!({ "name": "launch_rocket" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown tool: launch_rocket");
}
