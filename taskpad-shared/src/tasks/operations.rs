/// Task mutations and queries
///
/// Each operation takes the store, the authenticated owner and its
/// arguments. Input is validated before any storage access; the operation
/// then runs in exactly one transaction, committed only on success.
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::store::MemoryStore;
/// use taskpad_shared::tasks::operations::{add_task, toggle_complete, AddTask};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), taskpad_shared::tasks::TaskError> {
/// let store = MemoryStore::new();
/// let owner = Uuid::new_v4();
///
/// add_task(&store, owner, AddTask {
///     title: "Buy groceries".to_string(),
///     ..Default::default()
/// })
/// .await?;
///
/// let done = toggle_complete(&store, owner, "grocer").await?;
/// assert_eq!(done.task.status, "completed");
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{TaskError, TaskResult};
use super::resolver::{resolve, TaskRef};
use super::validation::{
    normalize_description, normalize_priority, normalize_tags, normalize_title,
};
use crate::models::task::{Priority, StatusFilter, Task, TaskView};
use crate::store::{Store, StoreError, StoreTx};

/// Tags as either a comma-separated string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    Csv(String),
    List(Vec<String>),
}

impl TagsInput {
    fn normalize(&self) -> Vec<String> {
        match self {
            TagsInput::Csv(raw) => normalize_tags(raw),
            TagsInput::List(items) => items
                .iter()
                .flat_map(|item| normalize_tags(item))
                .collect(),
        }
    }
}

impl From<&str> for TagsInput {
    fn from(raw: &str) -> Self {
        TagsInput::Csv(raw.to_string())
    }
}

/// Arguments for [`add_task`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
}

/// Arguments for [`update_task`]; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(default)]
    pub title: Option<String>,
    /// An empty description clears it
    #[serde(default)]
    pub description: Option<String>,
    /// A blank priority resets it to medium
    #[serde(default)]
    pub priority: Option<String>,
    /// Empty tags clear them
    #[serde(default)]
    pub tags: Option<TagsInput>,
}

/// Validated form of [`UpdateTask`]
struct TaskChanges {
    title: Option<String>,
    description: Option<Option<String>>,
    priority: Option<Priority>,
    tags: Option<Vec<String>>,
}

impl UpdateTask {
    fn validate(&self) -> TaskResult<TaskChanges> {
        Ok(TaskChanges {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            description: self.description.as_deref().map(normalize_description),
            priority: self
                .priority
                .as_deref()
                .map(|p| normalize_priority(Some(p)))
                .transpose()?,
            tags: self.tags.as_ref().map(TagsInput::normalize),
        })
    }
}

impl TaskChanges {
    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
    }
}

/// A single task plus a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub success: bool,
    pub message: String,
    pub task: TaskView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub success: bool,
    pub count: usize,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub task_id: Uuid,
}

/// Summary entry for a task completed in bulk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub id: Uuid,
    pub title: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCompleteResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub tasks_completed: Vec<CompletedTask>,
}

fn parse_task_id(raw: &str) -> TaskResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| TaskError::InvalidIdentifier("Invalid task ID format".to_string()))
}

fn ensure_owner(task: &Task, owner: Uuid, verb: &str) -> TaskResult<()> {
    if task.user_id == owner {
        Ok(())
    } else {
        Err(TaskError::Forbidden(format!(
            "Not authorized to {} this task",
            verb
        )))
    }
}

/// Creates a pending task
pub async fn add_task<S: Store>(store: &S, owner: Uuid, args: AddTask) -> TaskResult<TaskResponse> {
    let title = normalize_title(&args.title)?;
    let priority = normalize_priority(args.priority.as_deref())?;
    let tags = args.tags.as_ref().map(TagsInput::normalize).unwrap_or_default();
    let description = args.description.as_deref().and_then(normalize_description);

    let task = Task::new(owner, title, description, priority, tags);

    let fail = |e: StoreError| TaskError::store("add task", e);
    let mut tx = store.begin().await.map_err(fail)?;
    tx.insert_task(&task).await.map_err(fail)?;
    tx.commit().await.map_err(fail)?;

    info!(user_id = %owner, task_id = %task.id, "Task added");

    Ok(TaskResponse {
        success: true,
        message: format!("Task '{}' added successfully", task.title),
        task: TaskView::from(&task),
    })
}

/// Lists the owner's tasks, newest first
///
/// `status_filter` is matched leniently: unknown values list everything and
/// `deleted` always lists nothing.
pub async fn list_tasks<S: Store>(
    store: &S,
    owner: Uuid,
    status_filter: Option<&str>,
) -> TaskResult<TaskListResponse> {
    let filter = StatusFilter::parse_lenient(status_filter);

    let fail = |e: StoreError| TaskError::store("list tasks", e);
    let mut tx = store.begin().await.map_err(fail)?;
    let tasks = tx.list_tasks(owner, filter).await.map_err(fail)?;
    tx.commit().await.map_err(fail)?;

    debug!(user_id = %owner, ?filter, count = tasks.len(), "Tasks listed");

    let tasks: Vec<TaskView> = tasks.iter().map(TaskView::from).collect();
    Ok(TaskListResponse {
        success: true,
        count: tasks.len(),
        tasks,
    })
}

/// Applies the supplied fields to a task identified by UUID
///
/// The id, existence and ownership are checked before any field is validated.
pub async fn update_task<S: Store>(
    store: &S,
    owner: Uuid,
    id: &str,
    args: UpdateTask,
) -> TaskResult<TaskResponse> {
    let id = parse_task_id(id)?;

    let fail = |e: StoreError| TaskError::store("update task", e);
    let mut tx = store.begin().await.map_err(fail)?;

    let mut task = tx
        .find_task(id)
        .await
        .map_err(fail)?
        .ok_or_else(|| TaskError::NotFound("Task not found".to_string()))?;
    ensure_owner(&task, owner, "update")?;

    let changes = args.validate()?;
    changes.apply(&mut task);
    task.touch();

    if !tx.update_task(&task).await.map_err(fail)? {
        return Err(TaskError::NotFound("Task not found".to_string()));
    }
    tx.commit().await.map_err(fail)?;

    info!(user_id = %owner, task_id = %task.id, "Task updated");

    Ok(TaskResponse {
        success: true,
        message: format!("Task '{}' updated successfully", task.title),
        task: TaskView::from(&task),
    })
}

/// Deletes a task identified by UUID
pub async fn delete_task<S: Store>(store: &S, owner: Uuid, id: &str) -> TaskResult<DeleteResponse> {
    let id = parse_task_id(id)?;

    let fail = |e: StoreError| TaskError::store("delete task", e);
    let mut tx = store.begin().await.map_err(fail)?;

    let task = tx
        .find_task(id)
        .await
        .map_err(fail)?
        .ok_or_else(|| TaskError::NotFound("Task not found".to_string()))?;
    ensure_owner(&task, owner, "delete")?;

    tx.delete_task(id).await.map_err(fail)?;
    tx.commit().await.map_err(fail)?;

    info!(user_id = %owner, task_id = %id, "Task deleted");

    Ok(DeleteResponse {
        success: true,
        message: format!("Task with ID {} deleted successfully", id),
        task_id: id,
    })
}

/// Flips completion of the task named by a UUID or search text
pub async fn toggle_complete<S: Store>(
    store: &S,
    owner: Uuid,
    id_or_text: &str,
) -> TaskResult<TaskResponse> {
    let task_ref = TaskRef::parse(id_or_text);
    task_ref.check("complete")?;

    let fail = |e: StoreError| TaskError::store("toggle task completion", e);
    let mut tx = store.begin().await.map_err(fail)?;

    let mut task = resolve(&mut tx, owner, &task_ref)
        .await
        .map_err(fail)?
        .into_task(&task_ref, "complete")?;
    ensure_owner(&task, owner, "update")?;

    task.completed = !task.completed;
    task.touch();

    if !tx.update_task(&task).await.map_err(fail)? {
        return Err(TaskError::NotFound("Task not found".to_string()));
    }
    tx.commit().await.map_err(fail)?;

    info!(
        user_id = %owner,
        task_id = %task.id,
        completed = task.completed,
        "Task completion toggled"
    );

    Ok(TaskResponse {
        success: true,
        message: format!("Task '{}' marked as {}", task.title, task.status()),
        task: TaskView::from(&task),
    })
}

/// Deletes the single task whose title or description contains `search_text`
///
/// The input is always treated as text, so a UUID or a `<task_id>`
/// placeholder never deletes by id.
pub async fn delete_by_search<S: Store>(
    store: &S,
    owner: Uuid,
    search_text: &str,
) -> TaskResult<DeleteResponse> {
    let task_ref = TaskRef::text(search_text);
    task_ref.check("delete")?;

    let fail = |e: StoreError| TaskError::store("delete task", e);
    let mut tx = store.begin().await.map_err(fail)?;

    let task = resolve(&mut tx, owner, &task_ref)
        .await
        .map_err(fail)?
        .into_task(&task_ref, "delete")?;
    ensure_owner(&task, owner, "delete")?;

    tx.delete_task(task.id).await.map_err(fail)?;
    tx.commit().await.map_err(fail)?;

    info!(user_id = %owner, task_id = %task.id, "Task deleted by search");

    Ok(DeleteResponse {
        success: true,
        message: format!("Task '{}' deleted successfully", task.title),
        task_id: task.id,
    })
}

/// Completes every pending task of the owner, all or nothing
pub async fn complete_all_pending<S: Store>(
    store: &S,
    owner: Uuid,
) -> TaskResult<BulkCompleteResponse> {
    let fail = |e: StoreError| TaskError::store("complete all pending tasks", e);
    let mut tx = store.begin().await.map_err(fail)?;

    let pending = tx
        .list_tasks(owner, StatusFilter::Pending)
        .await
        .map_err(fail)?;

    if pending.is_empty() {
        return Ok(BulkCompleteResponse {
            success: true,
            message: "No pending tasks to complete.".to_string(),
            count: 0,
            tasks_completed: Vec::new(),
        });
    }

    let mut completed = Vec::with_capacity(pending.len());
    for mut task in pending {
        task.completed = true;
        task.touch();
        tx.update_task(&task).await.map_err(fail)?;
        completed.push(CompletedTask {
            id: task.id,
            title: task.title,
            priority: task.priority,
        });
    }
    tx.commit().await.map_err(fail)?;

    info!(user_id = %owner, count = completed.len(), "Pending tasks completed");

    Ok(BulkCompleteResponse {
        success: true,
        message: format!("Successfully completed {} pending task(s).", completed.len()),
        count: completed.len(),
        tasks_completed: completed,
    })
}
