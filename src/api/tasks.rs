//! Task API endpoints.

use axum::extract::State;

use super::extract::{Json, Path, Query};
use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateTaskRequest, Task, TaskSearchParams, UpdateTaskRequest, Validate};
use crate::AppState;

/// GET /api/tasks - List tasks, optionally filtered.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskSearchParams>,
) -> ApiResult<Vec<Task>> {
    match state.repo.list_tasks(&params).await {
        Ok(tasks) => success(tasks),
        Err(e) => error(e),
    }
}

/// GET /api/tasks/:id - Get a single task.
pub async fn get_task(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Task> {
    match state.repo.get_task(id).await {
        Ok(Some(task)) => success(task),
        Ok(None) => error(AppError::NotFound(format!("Task {} not found", id))),
        Err(e) => error(e),
    }
}

/// POST /api/tasks - Create a new task.
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<Task> {
    if let Err(e) = request.validate() {
        return error(e.into());
    }

    match state.repo.create_task(&request).await {
        Ok(task) => success(task),
        Err(e) => error(e),
    }
}

/// PUT /api/tasks/:id - Update a task.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Task> {
    if let Err(e) = request.validate() {
        return error(e.into());
    }

    match state.repo.update_task(id, &request).await {
        Ok(task) => success(task),
        Err(e) => error(e),
    }
}

/// DELETE /api/tasks/:id - Delete a task.
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    match state.repo.delete_task(id).await {
        Ok(()) => success(()),
        Err(e) => error(e),
    }
}
