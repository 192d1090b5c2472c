//! Task status endpoint

use axum::extract::{Path, State};
use serde::Serialize;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::TaskStatus;

#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: Uuid,
    #[serde(flatten)]
    pub status: TaskStatus,
}

/// GET /api/v1/tasks/{task_id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    let task_id = Uuid::parse_str(&task_id).map_err(|_| {
        ApiError::bad_request(format!("Invalid task id '{}'", task_id)).with_param("task_id")
    })?;

    let status = state
        .invoker
        .task_runner()
        .status(&task_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Task '{}' not found", task_id)))?;

    Ok(Json(TaskStatusResponse { task_id, status }))
}
