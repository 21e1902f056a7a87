/// Task model and database operations
///
/// A task is a personal to-do item owned by exactly one user. Completion is
/// the only status a task carries; deleting a task removes the row.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     priority task_priority NOT NULL DEFAULT 'medium',
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL,
///     CHECK (updated_at >= created_at)
/// );
/// ```
///
/// The query functions take a `&mut PgConnection` so they can run inside a
/// transaction (`&mut *tx`) as well as on a pooled connection.
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::models::task::{Priority, Task};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::new(owner, "Buy milk".to_string(), None, Priority::Medium, vec![]);
///
/// let mut tx = pool.begin().await?;
/// Task::insert(&mut tx, &task).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::clock;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Converts priority to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// Which tasks a listing should return
///
/// `Deleted` is accepted for compatibility with clients that ask for it, but
/// tasks are hard-deleted so it never matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    Deleted,
}

impl StatusFilter {
    /// Parses a filter leniently: unknown values fall back to `All`
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("pending") => StatusFilter::Pending,
            Some("completed") => StatusFilter::Completed,
            Some("deleted") => StatusFilter::Deleted,
            _ => StatusFilter::All,
        }
    }

    /// Completion flag a stored task must have to match, if any
    pub fn completed_flag(&self) -> Option<bool> {
        match self {
            StatusFilter::Pending => Some(false),
            StatusFilter::Completed => Some(true),
            StatusFilter::All | StatusFilter::Deleted => None,
        }
    }

    /// Whether a stored task passes this filter
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::Deleted => false,
            _ => self
                .completed_flag()
                .map_or(true, |flag| task.completed == flag),
        }
    }
}

/// Task row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user, fixed at creation
    pub user_id: Uuid,

    /// Trimmed, non-empty, at most 255 characters
    pub title: String,

    /// Trimmed description (never an empty string)
    pub description: Option<String>,

    pub priority: Priority,

    /// Ordered, non-empty trimmed tags
    pub tags: Vec<String>,

    pub completed: bool,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation, never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a new, pending task owned by `user_id`
    ///
    /// Field values are stored as given; callers are expected to have run
    /// them through [`crate::tasks::validation`] first.
    pub fn new(
        user_id: Uuid,
        title: String,
        description: Option<String>,
        priority: Priority,
        tags: Vec<String>,
    ) -> Self {
        let now = clock::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            priority,
            tags,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at` after a mutation
    pub fn touch(&mut self) {
        self.updated_at = clock::next_after(self.updated_at.max(self.created_at));
    }

    /// "completed" or "pending"
    pub fn status(&self) -> &'static str {
        if self.completed {
            "completed"
        } else {
            "pending"
        }
    }

    /// Whether the title or description contains `needle`, ignoring case
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    /// Inserts a task row
    pub async fn insert(conn: &mut PgConnection, task: &Task) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, user_id, title, description, priority, tags,
                               completed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(&task.tags)
        .bind(task.completed)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Finds a task by ID, regardless of owner
    ///
    /// Ownership is checked by the caller so that "exists but not yours" can
    /// be told apart from "does not exist".
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, priority, tags,
                   completed, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(task)
    }

    /// Lists a user's tasks, newest first
    pub async fn list_by_owner(
        conn: &mut PgConnection,
        user_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        if filter == StatusFilter::Deleted {
            return Ok(Vec::new());
        }

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, priority, tags,
                   completed, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
              AND ($2::BOOLEAN IS NULL OR completed = $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.completed_flag())
        .fetch_all(conn)
        .await?;

        Ok(tasks)
    }

    /// Case-insensitive substring search over a user's titles and descriptions
    ///
    /// `%` and `_` in `term` match literally. Results are newest first.
    pub async fn search_by_owner(
        conn: &mut PgConnection,
        user_id: Uuid,
        term: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(term));

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, priority, tags,
                   completed, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
              AND (title ILIKE $2 ESCAPE '\'
                   OR (description IS NOT NULL AND description ILIKE $2 ESCAPE '\'))
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .fetch_all(conn)
        .await?;

        Ok(tasks)
    }

    /// Writes every mutable column of an existing task
    ///
    /// Returns false if the row no longer exists.
    pub async fn save(conn: &mut PgConnection, task: &Task) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                priority = $4,
                tags = $5,
                completed = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(&task.tags)
        .bind(task.completed)
        .bind(task.updated_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a task
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Escapes LIKE metacharacters so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Task as returned to API and assistant callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// "completed" or "pending"
    pub status: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    /// Time of the last mutation while completed; null for pending tasks
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status().to_string(),
            priority: task.priority,
            tags: task.tags.clone(),
            completed_at: task.completed.then_some(task.updated_at),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, description: Option<&str>) -> Task {
        Task::new(
            Uuid::new_v4(),
            title.to_string(),
            description.map(str::to_string),
            Priority::Medium,
            vec![],
        )
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("low".parse::<Priority>(), Ok(Priority::Low));
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" Medium ".parse::<Priority>(), Ok(Priority::Medium));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_status_filter_parse_lenient() {
        assert_eq!(StatusFilter::parse_lenient(None), StatusFilter::All);
        assert_eq!(StatusFilter::parse_lenient(Some("Pending")), StatusFilter::Pending);
        assert_eq!(StatusFilter::parse_lenient(Some("completed")), StatusFilter::Completed);
        assert_eq!(StatusFilter::parse_lenient(Some("DELETED")), StatusFilter::Deleted);
        assert_eq!(StatusFilter::parse_lenient(Some("archived")), StatusFilter::All);
    }

    #[test]
    fn test_status_filter_matches() {
        let mut task = sample("Write report", None);
        assert!(StatusFilter::All.matches(&task));
        assert!(StatusFilter::Pending.matches(&task));
        assert!(!StatusFilter::Completed.matches(&task));

        task.completed = true;
        assert!(StatusFilter::Completed.matches(&task));
        assert!(!StatusFilter::Pending.matches(&task));
        assert!(!StatusFilter::Deleted.matches(&task));
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = sample("Write report", None);
        assert!(!task.completed);
        assert_eq!(task.status(), "pending");
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_touch_moves_updated_at_forward() {
        let mut task = sample("Write report", None);
        let before = task.updated_at;
        task.touch();
        assert!(task.updated_at > before);
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn test_matches_text() {
        let task = sample("Buy milk", Some("From the Corner shop"));
        assert!(task.matches_text("MILK"));
        assert!(task.matches_text("corner"));
        assert!(!task.matches_text("bread"));

        let bare = sample("Buy bread", None);
        assert!(!bare.matches_text("corner"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_task_view_completed_at() {
        let mut task = sample("Buy milk", None);
        assert_eq!(TaskView::from(&task).completed_at, None);

        task.completed = true;
        task.touch();
        let view = TaskView::from(&task);
        assert_eq!(view.status, "completed");
        assert_eq!(view.completed_at, Some(task.updated_at));
    }
}
