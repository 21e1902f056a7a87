/// Transactional data access for users and tasks
///
/// Task operations never talk to a database directly. They are handed a
/// [`Store`], open one [`StoreTx`] per operation and either commit it or
/// drop it. Dropping an uncommitted transaction rolls it back.
///
/// Two backends are provided:
///
/// - [`PgStore`]: PostgreSQL via sqlx, used by the API server
/// - [`MemoryStore`]: in-process maps, used by tests and local tooling
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::store::{MemoryStore, Store, StoreTx};
/// use taskpad_shared::models::task::StatusFilter;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), taskpad_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// let mut tx = store.begin().await?;
/// let tasks = tx.list_tasks(Uuid::new_v4(), StatusFilter::All).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::task::{StatusFilter, Task};
use crate::models::user::User;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure raised by a non-SQL backend
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A handle that can open transactions
///
/// Implementations are cheap to clone and shared across request handlers.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    type Tx: StoreTx;

    /// Opens a new transaction
    async fn begin(&self) -> StoreResult<Self::Tx>;

    /// Checks the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// One open transaction
///
/// Every read sees the writes made earlier in the same transaction. Nothing
/// is visible to other transactions until [`StoreTx::commit`].
#[async_trait]
pub trait StoreTx: Send {
    /// Inserts a user, failing with [`StoreError::Conflict`] if the email
    /// is already registered
    async fn insert_user(&mut self, user: &User) -> StoreResult<()>;

    async fn find_user_by_id(&mut self, id: Uuid) -> StoreResult<Option<User>>;

    /// Looks a user up by email, ignoring case
    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;

    /// Persists profile and login fields; false if the user is gone
    async fn update_user(&mut self, user: &User) -> StoreResult<bool>;

    async fn insert_task(&mut self, task: &Task) -> StoreResult<()>;

    /// Finds a task by id regardless of owner
    async fn find_task(&mut self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Lists an owner's tasks, newest first
    async fn list_tasks(&mut self, owner: Uuid, filter: StatusFilter) -> StoreResult<Vec<Task>>;

    /// Case-insensitive substring search over an owner's titles and
    /// descriptions, newest first
    async fn search_tasks(&mut self, owner: Uuid, term: &str) -> StoreResult<Vec<Task>>;

    /// Persists every mutable task field; false if the task is gone
    async fn update_task(&mut self, task: &Task) -> StoreResult<bool>;

    /// Removes a task; false if it did not exist
    async fn delete_task(&mut self, id: Uuid) -> StoreResult<bool>;

    /// Makes every write in this transaction visible
    async fn commit(self) -> StoreResult<()>;
}
