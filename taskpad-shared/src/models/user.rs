/// User model and database operations
///
/// This module provides the User model and the queries used to register
/// accounts, look them up at login and maintain profile fields.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE auth_provider AS ENUM ('email', 'google', 'github');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255),
///     provider auth_provider NOT NULL DEFAULT 'email',
///     first_name VARCHAR(100),
///     last_name VARCHAR(100),
///     bio VARCHAR(500),
///     location VARCHAR(100),
///     timezone VARCHAR(50) NOT NULL DEFAULT 'UTC',
///     theme_preference VARCHAR(20) NOT NULL DEFAULT 'dark',
///     created_at TIMESTAMPTZ NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL,
///     last_login_at TIMESTAMPTZ
/// );
/// CREATE UNIQUE INDEX idx_users_email_lower ON users (LOWER(email));
/// ```
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::new(CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: Some("$argon2id$...".to_string()),
///     first_name: Some("Ada".to_string()),
///     last_name: None,
/// });
///
/// let mut conn = pool.acquire().await?;
/// User::insert(&mut conn, &user).await?;
///
/// let found = User::find_by_email(&mut conn, "USER@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::clock;

/// How an account authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Email and password
    #[default]
    Email,
    Google,
    Github,
}

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext. Accounts
/// created through an external provider have no password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, stored lowercase and unique ignoring case
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    pub provider: AuthProvider,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,

    /// IANA time zone name
    pub timezone: String,

    /// UI theme ("dark" or "light")
    pub theme_preference: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for registering a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address (normalized to lowercase on creation)
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: Option<String>,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Profile changes requested by the user
///
/// Only `Some` fields are applied. An empty string clears an optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub timezone: Option<String>,
    pub theme_preference: Option<String>,
}

impl User {
    /// Builds a new email/password account
    pub fn new(data: CreateUser) -> Self {
        let now = clock::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&data.email),
            password_hash: data.password_hash,
            provider: AuthProvider::Email,
            first_name: data.first_name,
            last_name: data.last_name,
            bio: None,
            location: None,
            timezone: "UTC".to_string(),
            theme_preference: "dark".to_string(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Applies profile changes in place and refreshes `updated_at`
    pub fn apply_profile(&mut self, changes: UpdateProfile) {
        fn clearable(value: String) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }

        if let Some(v) = changes.first_name {
            self.first_name = clearable(v);
        }
        if let Some(v) = changes.last_name {
            self.last_name = clearable(v);
        }
        if let Some(v) = changes.bio {
            self.bio = clearable(v);
        }
        if let Some(v) = changes.location {
            self.location = clearable(v);
        }
        if let Some(v) = changes.timezone.and_then(clearable) {
            self.timezone = v;
        }
        if let Some(v) = changes.theme_preference.and_then(clearable) {
            self.theme_preference = v;
        }
        self.updated_at = clock::next_after(self.updated_at);
    }

    /// Inserts a user row
    ///
    /// # Errors
    ///
    /// Returns a database error carrying the `idx_users_email_lower`
    /// constraint if the email is already registered.
    pub async fn insert(conn: &mut PgConnection, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, provider, first_name, last_name,
                               bio, location, timezone, theme_preference,
                               created_at, updated_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.provider)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.bio)
        .bind(&user.location)
        .bind(&user.timezone)
        .bind(&user.theme_preference)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Finds a user by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, provider, first_name, last_name, bio,
                   location, timezone, theme_preference, created_at, updated_at,
                   last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address, ignoring case
    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, provider, first_name, last_name, bio,
                   location, timezone, theme_preference, created_at, updated_at,
                   last_login_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Writes the mutable columns of an existing user
    pub async fn save(conn: &mut PgConnection, user: &User) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2,
                last_name = $3,
                bio = $4,
                location = $5,
                timezone = $6,
                theme_preference = $7,
                updated_at = $8,
                last_login_at = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.bio)
        .bind(&user.location)
        .bind(&user.timezone)
        .bind(&user.theme_preference)
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Canonical form used for storage and comparison
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Profile as returned to the account owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub provider: AuthProvider,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub timezone: String,
    pub theme_preference: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            provider: user.provider,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: user.bio.clone(),
            location: user.location.clone(),
            timezone: user.timezone.clone(),
            theme_preference: user.theme_preference.clone(),
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}
