/// Task routes
///
/// Authenticated CRUD over the board. Handlers validate at the boundary
/// and delegate to the task directory, which persists, re-reads the
/// joined projection, and broadcasts. HTTP responses and broadcast
/// payloads therefore carry the exact same task shape.

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::models::task::{NewTask, TaskStatus, TaskWithUsers};
use validator::Validate;

/// Request body for POST /api/tasks
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional assignee user ID
    pub assigned_to: Option<i64>,
}

/// Request body for PATCH /api/tasks/:id/status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status label (TODO, IN_PROGRESS, or DONE)
    pub status: String,
}

/// GET /api/tasks
///
/// Lists every task with denormalized user summaries, newest first.
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskWithUsers>>> {
    let tasks = state.tasks.list_all().await?;
    Ok(Json(tasks))
}

/// POST /api/tasks
///
/// Creates a task in TODO status, credited to the authenticated user.
/// The response body matches the TASK_CREATED payload sent to all live
/// connections.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(body): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskWithUsers>)> {
    body.validate()?;

    let task = state
        .tasks
        .create(
            NewTask {
                title: body.title,
                description: body.description,
                assigned_to: body.assigned_to,
            },
            current_user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /api/tasks/:id/status
///
/// Moves a task between board columns. Unknown status labels are
/// rejected here, before the directory is involved.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TaskWithUsers>> {
    let status: TaskStatus = body.status.parse().map_err(|_| {
        ApiError::BadRequest("Status must be one of TODO, IN_PROGRESS, DONE".to_string())
    })?;

    let task = state.tasks.set_status(id, status).await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/:id
///
/// Deletes a task. Any authenticated user may delete any task; there is
/// no ownership check.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.tasks.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
