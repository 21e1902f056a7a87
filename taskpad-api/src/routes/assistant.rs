/// Tool endpoints for assistant integrations
///
/// ```text
/// GET  /v1/assistant/tools        -> { "tools": [ { "name": "add_task", ... } ] }
/// POST /v1/assistant/tools/call   <- { "name": "toggle_complete", "arguments": { "id_or_text": "milk" } }
/// ```
///
/// A successful call returns the operation's JSON result unchanged; failures
/// use the regular error body, including `candidates` for ambiguous text.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};
use taskpad_shared::{
    auth::middleware::AuthContext,
    store::Store,
    tasks::tools::{self, ToolCall},
};
use tracing::info;

pub async fn list_tools() -> Json<Value> {
    Json(json!({ "tools": tools::catalogue() }))
}

pub async fn call_tool<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Json(call): Json<ToolCall>,
) -> ApiResult<Json<Value>> {
    info!(user_id = %auth.user_id, tool = %call.name, "Assistant tool call");
    let result = tools::dispatch(&state.store, auth.user_id, call).await?;
    Ok(Json(result))
}
