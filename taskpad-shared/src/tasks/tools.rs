/// Named-tool dispatch for assistant integrations
///
/// An assistant emits calls like
/// `{"name": "toggle_complete", "arguments": {"id_or_text": "groceries"}}`.
/// [`dispatch`] decodes the arguments, runs the matching operation and
/// returns its response as JSON. [`catalogue`] describes every tool so a
/// prompt can be built from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::error::{TaskError, TaskResult};
use super::operations::{self, AddTask, UpdateTask};
use crate::store::Store;

/// A tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    /// JSON object; null or missing means no arguments
    #[serde(default)]
    pub arguments: Value,
}

/// Description of one tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "add_task",
        description: "Create a new task. Tags are comma-separated; priority is low, medium or high.",
        required: &["title"],
        optional: &["description", "priority", "tags"],
    },
    ToolSpec {
        name: "list_tasks",
        description: "List tasks, newest first. status_filter is all, pending or completed.",
        required: &[],
        optional: &["status_filter"],
    },
    ToolSpec {
        name: "update_task",
        description: "Change the title, description, priority or tags of a task by ID.",
        required: &["id"],
        optional: &["title", "description", "priority", "tags"],
    },
    ToolSpec {
        name: "delete_task",
        description: "Delete a task by ID.",
        required: &["id"],
        optional: &[],
    },
    ToolSpec {
        name: "toggle_complete",
        description: "Mark a task completed or pending. Accepts a task ID or words from its title or description.",
        required: &["id_or_text"],
        optional: &[],
    },
    ToolSpec {
        name: "delete_task_by_search",
        description: "Delete the one task whose title or description contains the search text.",
        required: &["search_text"],
        optional: &[],
    },
    ToolSpec {
        name: "complete_all_pending_tasks",
        description: "Mark every pending task as completed.",
        required: &[],
        optional: &[],
    },
];

/// Every tool [`dispatch`] understands
pub fn catalogue() -> &'static [ToolSpec] {
    TOOLS
}

#[derive(Deserialize)]
struct ListArgs {
    #[serde(default)]
    status_filter: Option<String>,
}

#[derive(Deserialize)]
struct UpdateArgs {
    id: String,
    #[serde(flatten)]
    changes: UpdateTask,
}

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

#[derive(Deserialize)]
struct ToggleArgs {
    #[serde(alias = "id")]
    id_or_text: String,
}

#[derive(Deserialize)]
struct SearchArgs {
    #[serde(alias = "search_term")]
    search_text: String,
}

fn decode<T: serde::de::DeserializeOwned>(tool: &str, arguments: Value) -> TaskResult<T> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };

    serde_json::from_value(arguments)
        .map_err(|e| TaskError::Validation(format!("Invalid arguments for {}: {}", tool, e)))
}

fn encode<T: Serialize>(response: T) -> TaskResult<Value> {
    serde_json::to_value(response)
        .map_err(|e| TaskError::Internal(format!("Failed to encode tool result: {}", e)))
}

/// Runs a tool call on behalf of `owner`
pub async fn dispatch<S: Store>(store: &S, owner: Uuid, call: ToolCall) -> TaskResult<Value> {
    let ToolCall { name, arguments } = call;
    debug!(user_id = %owner, tool = %name, "Dispatching tool call");

    match name.as_str() {
        "add_task" => {
            let args: AddTask = decode(&name, arguments)?;
            encode(operations::add_task(store, owner, args).await?)
        }
        "list_tasks" => {
            let args: ListArgs = decode(&name, arguments)?;
            encode(operations::list_tasks(store, owner, args.status_filter.as_deref()).await?)
        }
        "update_task" => {
            let args: UpdateArgs = decode(&name, arguments)?;
            encode(operations::update_task(store, owner, &args.id, args.changes).await?)
        }
        "delete_task" => {
            let args: IdArgs = decode(&name, arguments)?;
            encode(operations::delete_task(store, owner, &args.id).await?)
        }
        "toggle_complete" => {
            let args: ToggleArgs = decode(&name, arguments)?;
            encode(operations::toggle_complete(store, owner, &args.id_or_text).await?)
        }
        "delete_task_by_search" => {
            let args: SearchArgs = decode(&name, arguments)?;
            encode(operations::delete_by_search(store, owner, &args.search_text).await?)
        }
        "complete_all_pending_tasks" => {
            encode(operations::complete_all_pending(store, owner).await?)
        }
        other => Err(TaskError::Validation(format!("Unknown tool: {}", other))),
    }
}
