/// Database models for Taskpad
///
/// # Models
///
/// - `user`: User accounts, credentials and profile fields
/// - `task`: Personal tasks owned by a user
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::models::task::{Priority, Task};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), sqlx::Error> {
/// let mut conn = pool.acquire().await?;
/// let tasks = Task::list_by_owner(&mut conn, owner, Default::default()).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;
