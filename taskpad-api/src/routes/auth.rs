/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Create an account and receive tokens
/// - `POST /v1/auth/login` - Exchange email and password for tokens
/// - `POST /v1/auth/refresh` - Exchange a refresh token for an access token
///
/// Argon2 hashing is CPU-bound and runs on the blocking thread pool.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskpad_shared::{
    auth::{jwt, password},
    clock,
    models::user::{CreateUser, User, UserProfile},
    store::{Store, StoreTx},
};
use tracing::{info, warn};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked against the password policy after field validation
    pub password: String,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    #[serde(flatten)]
    pub tokens: jwt::TokenPair,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".to_string())
}

async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("Blocking task failed: {}", e)))
}

/// Registers an email/password account
///
/// # Errors
///
/// - `422`: Malformed email, over-long names or weak password
/// - `409`: Email already registered (ignoring case)
pub async fn register<S: Store>(
    State(state): State<AppState<S>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;
    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::InvalidFields(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    let plain = req.password;
    let password_hash = blocking(move || password::hash_password(&plain)).await??;

    let user = User::new(CreateUser {
        email: req.email,
        password_hash: Some(password_hash),
        first_name: req.first_name,
        last_name: req.last_name,
    });

    let mut tx = state.store.begin().await?;
    tx.insert_user(&user).await?;
    tx.commit().await?;

    info!(user_id = %user.id, "User registered");

    let tokens = jwt::issue_token_pair(user.id, state.jwt_secret())?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserProfile::from(&user),
            tokens,
        }),
    ))
}

/// Logs in with email and password
///
/// Unknown emails, wrong passwords and accounts without a password all
/// produce the same `401`. The password is verified between two short
/// transactions so no store lock or pooled connection is held while hashing.
pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let candidate = {
        let mut tx = state.store.begin().await?;
        tx.find_user_by_email(&req.email)
            .await?
            .ok_or_else(invalid_credentials)?
    };

    let hash = candidate.password_hash.ok_or_else(invalid_credentials)?;
    let plain = req.password;
    let valid = blocking(move || password::verify_password(&plain, &hash)).await??;
    if !valid {
        warn!(user_id = %candidate.id, "Failed login attempt");
        return Err(invalid_credentials());
    }

    let mut tx = state.store.begin().await?;
    let mut user = tx
        .find_user_by_id(candidate.id)
        .await?
        .ok_or_else(invalid_credentials)?;
    user.last_login_at = Some(clock::now());
    tx.update_user(&user).await?;
    tx.commit().await?;

    info!(user_id = %user.id, "User logged in");

    let tokens = jwt::issue_token_pair(user.id, state.jwt_secret())?;
    Ok(Json(AuthResponse {
        user: UserProfile::from(&user),
        tokens,
    }))
}

/// Exchanges a refresh token for a new access token
pub async fn refresh<S: Store>(
    State(state): State<AppState<S>>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt::TokenType::Access.lifetime().num_seconds(),
    }))
}
