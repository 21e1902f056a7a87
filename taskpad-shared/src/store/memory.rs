/// In-memory store
///
/// Transactions are serialized by an async mutex that stays locked for the
/// whole transaction. Each transaction mutates a private copy of the data,
/// and commit swaps that copy in; dropping the transaction discards it.
///
/// Writes can be made to fail on demand with
/// [`MemoryStore::fail_writes_after`], which lets tests observe rollback.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, StoreTx};
use crate::models::task::{StatusFilter, Task};
use crate::models::user::{normalize_email, User};

const UNLIMITED: usize = usize::MAX;

#[derive(Debug, Clone, Default)]
struct MemoryData {
    users: HashMap<Uuid, User>,
    /// Tasks in insertion order
    tasks: Vec<Task>,
}

/// Store holding everything in process memory
#[derive(Debug, Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
    write_budget: Arc<AtomicUsize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(MemoryData::default())),
            write_budget: Arc::new(AtomicUsize::new(UNLIMITED)),
        }
    }

    /// Lets the next `n` writes succeed, then fails every write after that
    pub fn fail_writes_after(&self, n: usize) {
        self.write_budget.store(n, Ordering::SeqCst);
    }

    /// Stops injecting write failures
    pub fn clear_failures(&self) {
        self.write_budget.store(UNLIMITED, Ordering::SeqCst);
    }

    /// Committed tasks of one owner, in insertion order
    pub async fn snapshot_tasks(&self, owner: Uuid) -> Vec<Task> {
        let data = self.data.lock().await;
        data.tasks
            .iter()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        let guard = self.data.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx {
            guard,
            working,
            write_budget: self.write_budget.clone(),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Open in-memory transaction
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryData>,
    working: MemoryData,
    write_budget: Arc<AtomicUsize>,
}

impl MemoryTx {
    fn charge_write(&self) -> StoreResult<()> {
        let granted = self
            .write_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                UNLIMITED => Some(UNLIMITED),
                0 => None,
                n => Some(n - 1),
            });

        granted
            .map(|_| ())
            .map_err(|_| StoreError::Backend("injected write failure".to_string()))
    }

    /// Owner's tasks matching `keep`, newest first
    fn newest_first(&self, owner: Uuid, keep: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .working
            .tasks
            .iter()
            .filter(|t| t.user_id == owner && keep(t))
            .cloned()
            .collect();
        // Same order as the SQL queries: created_at DESC, id DESC
        tasks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        tasks
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        self.charge_write()?;
        let email = normalize_email(&user.email);
        if self
            .working
            .users
            .values()
            .any(|u| normalize_email(&u.email) == email)
        {
            return Err(StoreError::Conflict("idx_users_email_lower".to_string()));
        }
        self.working.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .working
            .users
            .values()
            .find(|u| normalize_email(&u.email) == email)
            .cloned())
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<bool> {
        self.charge_write()?;
        match self.working.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        self.charge_write()?;
        if self.working.tasks.iter().any(|t| t.id == task.id) {
            return Err(StoreError::Conflict("tasks_pkey".to_string()));
        }
        self.working.tasks.push(task.clone());
        Ok(())
    }

    async fn find_task(&mut self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.working.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&mut self, owner: Uuid, filter: StatusFilter) -> StoreResult<Vec<Task>> {
        Ok(self.newest_first(owner, |t| filter.matches(t)))
    }

    async fn search_tasks(&mut self, owner: Uuid, term: &str) -> StoreResult<Vec<Task>> {
        Ok(self.newest_first(owner, |t| t.matches_text(term)))
    }

    async fn update_task(&mut self, task: &Task) -> StoreResult<bool> {
        self.charge_write()?;
        match self.working.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_task(&mut self, id: Uuid) -> StoreResult<bool> {
        self.charge_write()?;
        let before = self.working.tasks.len();
        self.working.tasks.retain(|t| t.id != id);
        Ok(self.working.tasks.len() < before)
    }

    async fn commit(self) -> StoreResult<()> {
        let MemoryTx {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }
}
