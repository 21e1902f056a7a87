/// PostgreSQL store backed by an sqlx pool

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, StoreTx};
use crate::db::pool::health_check;
use crate::models::task::{StatusFilter, Task};
use crate::models::user::User;

/// Store that opens one PostgreSQL transaction per operation
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for migrations and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> StoreResult<PgTx> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }
}

/// Open PostgreSQL transaction
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

/// Maps unique-constraint violations onto [`StoreError::Conflict`]
fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.constraint().unwrap_or("unique constraint").to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        User::insert(&mut *self.tx, user).await.map_err(classify)
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&mut *self.tx, id).await?)
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&mut *self.tx, email).await?)
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<bool> {
        Ok(User::save(&mut *self.tx, user).await?)
    }

    async fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        Task::insert(&mut *self.tx, task).await.map_err(classify)
    }

    async fn find_task(&mut self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&mut *self.tx, id).await?)
    }

    async fn list_tasks(&mut self, owner: Uuid, filter: StatusFilter) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_owner(&mut *self.tx, owner, filter).await?)
    }

    async fn search_tasks(&mut self, owner: Uuid, term: &str) -> StoreResult<Vec<Task>> {
        Ok(Task::search_by_owner(&mut *self.tx, owner, term).await?)
    }

    async fn update_task(&mut self, task: &Task) -> StoreResult<bool> {
        Ok(Task::save(&mut *self.tx, task).await?)
    }

    async fn delete_task(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&mut *self.tx, id).await?)
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        debug!("Transaction committed");
        Ok(())
    }
}
