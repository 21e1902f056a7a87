/// Turns a caller-supplied identifier into a concrete task
///
/// An identifier is either a task UUID or free text. Text is matched as a
/// case-insensitive substring of the owner's task titles and descriptions.
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::store::{MemoryStore, Store};
/// use taskpad_shared::tasks::resolver::{resolve, Resolution, TaskRef};
/// use uuid::Uuid;
///
/// # async fn example(owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let mut tx = store.begin().await?;
///
/// match resolve(&mut tx, owner, &TaskRef::parse("grocery")).await? {
///     Resolution::Resolved(task) => println!("found {}", task.title),
///     Resolution::NotFound => println!("no match"),
///     Resolution::Ambiguous(candidates) => println!("{} matches", candidates.len()),
/// }
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use super::error::{Candidate, TaskError, TaskResult, MAX_CANDIDATES};
use crate::models::task::Task;
use crate::store::{StoreResult, StoreTx};

/// A parsed task identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    Id(Uuid),
    /// Trimmed search text
    Text(String),
}

impl TaskRef {
    /// Parses `raw` as a UUID in any standard form, falling back to text
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match Uuid::parse_str(trimmed) {
            Ok(id) => TaskRef::Id(id),
            Err(_) => TaskRef::Text(trimmed.to_string()),
        }
    }

    /// Treats `raw` as search text even if it looks like a UUID
    pub fn text(raw: &str) -> Self {
        TaskRef::Text(raw.trim().to_string())
    }

    /// Rejects placeholders like `<task_id>` and blank text
    ///
    /// `verb` names what the caller was trying to do ("complete", "delete").
    pub fn check(&self, verb: &str) -> TaskResult<()> {
        match self {
            TaskRef::Id(_) => Ok(()),
            TaskRef::Text(text) if text.is_empty() || is_placeholder(text) => {
                Err(TaskError::InvalidIdentifier(format!(
                    "Invalid task identifier provided. Please provide a valid task ID or description to {} the task.",
                    verb
                )))
            }
            TaskRef::Text(_) => Ok(()),
        }
    }
}

fn is_placeholder(text: &str) -> bool {
    text.starts_with('<') && text.ends_with('>')
}

/// Outcome of resolving a [`TaskRef`]
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(Task),
    NotFound,
    /// The first few of several matches, newest first
    Ambiguous(Vec<Candidate>),
}

impl Resolution {
    /// Converts an unresolved outcome into the matching [`TaskError`]
    pub fn into_task(self, task_ref: &TaskRef, verb: &str) -> TaskResult<Task> {
        match (self, task_ref) {
            (Resolution::Resolved(task), _) => Ok(task),
            (Resolution::NotFound, TaskRef::Id(_)) => {
                Err(TaskError::NotFound("Task not found".to_string()))
            }
            (Resolution::NotFound, TaskRef::Text(text)) => Err(TaskError::NotFound(format!(
                "Could not find a task with the description '{}'. Please provide the task ID or a more specific description to {} the task.",
                text, verb
            ))),
            (Resolution::Ambiguous(candidates), task_ref) => {
                let text = match task_ref {
                    TaskRef::Id(id) => id.to_string(),
                    TaskRef::Text(text) => text.clone(),
                };
                Err(TaskError::Ambiguous {
                    message: format!(
                        "Found multiple tasks matching '{}'. Please provide the specific task ID to {}.",
                        text, verb
                    ),
                    candidates,
                })
            }
        }
    }
}

/// Looks up the task `task_ref` points at
///
/// Ids are looked up regardless of owner so the caller can report
/// "not yours" separately. Text only ever searches `owner`'s tasks.
pub async fn resolve<T: StoreTx>(
    tx: &mut T,
    owner: Uuid,
    task_ref: &TaskRef,
) -> StoreResult<Resolution> {
    match task_ref {
        TaskRef::Id(id) => Ok(tx
            .find_task(*id)
            .await?
            .map_or(Resolution::NotFound, Resolution::Resolved)),
        TaskRef::Text(text) => {
            let mut matches = tx.search_tasks(owner, text).await?;
            Ok(match matches.len() {
                0 => Resolution::NotFound,
                1 => Resolution::Resolved(matches.remove(0)),
                _ => Resolution::Ambiguous(
                    matches
                        .into_iter()
                        .take(MAX_CANDIDATES)
                        .map(|t| Candidate {
                            id: t.id,
                            title: t.title,
                        })
                        .collect(),
                ),
            })
        }
    }
}
