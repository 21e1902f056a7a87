/// Authentication primitives
///
/// - [`password`]: Argon2id hashing and password policy
/// - [`jwt`]: HS256 access and refresh tokens
/// - [`middleware`]: Axum bearer-token middleware producing an `AuthContext`
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::auth::jwt::{issue_token_pair, validate_access_token};
/// use taskpad_shared::auth::password::{hash_password, verify_password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Str0ng!Pass")?;
/// assert!(verify_password("Str0ng!Pass", &hash)?);
///
/// let tokens = issue_token_pair(Uuid::new_v4(), "secret-key-of-at-least-32-bytes!")?;
/// validate_access_token(&tokens.access_token, "secret-key-of-at-least-32-bytes!")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
