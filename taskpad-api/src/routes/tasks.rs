/// REST endpoints for the authenticated user's tasks
///
/// Each handler is a thin wrapper over
/// [`taskpad_shared::tasks::operations`]; the owner always comes from the
/// access token, never from the request body.
///
/// # Endpoints
///
/// - `GET /v1/tasks?status=pending` - List tasks
/// - `POST /v1/tasks` - Create a task
/// - `PUT /v1/tasks/:id` - Update fields of a task
/// - `DELETE /v1/tasks/:id` - Delete a task
/// - `POST /v1/tasks/:id/toggle` - Toggle completion; `:id` may be search text
/// - `POST /v1/tasks/delete-by-search` - Delete the one task matching `search_text`
/// - `POST /v1/tasks/complete-pending` - Complete every pending task
///
/// # Example
///
/// ```text
/// POST /v1/tasks
/// Authorization: Bearer eyJ...
///
/// { "title": "Buy groceries", "priority": "high", "tags": "home, errands" }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskpad_shared::{
    auth::middleware::AuthContext,
    store::Store,
    tasks::operations::{
        self, AddTask, BulkCompleteResponse, DeleteResponse, TaskListResponse, TaskResponse,
        UpdateTask,
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// all, pending, completed or deleted
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(alias = "search_term")]
    pub search_text: String,
}

pub async fn list_tasks<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let response = operations::list_tasks(&state.store, auth.user_id, query.status.as_deref()).await?;
    Ok(Json(response))
}

pub async fn create_task<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Json(args): Json<AddTask>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let response = operations::add_task(&state.store, auth.user_id, args).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_task<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(args): Json<UpdateTask>,
) -> ApiResult<Json<TaskResponse>> {
    let response = operations::update_task(&state.store, auth.user_id, &id, args).await?;
    Ok(Json(response))
}

pub async fn delete_task<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let response = operations::delete_task(&state.store, auth.user_id, &id).await?;
    Ok(Json(response))
}

pub async fn toggle_task<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Path(id_or_text): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let response = operations::toggle_complete(&state.store, auth.user_id, &id_or_text).await?;
    Ok(Json(response))
}

pub async fn delete_by_search<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<Json<DeleteResponse>> {
    let response = operations::delete_by_search(&state.store, auth.user_id, &req.search_text).await?;
    Ok(Json(response))
}

pub async fn complete_pending<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<BulkCompleteResponse>> {
    let response = operations::complete_all_pending(&state.store, auth.user_id).await?;
    Ok(Json(response))
}
