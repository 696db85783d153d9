use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::store::{NewTask, Task, TaskAuthor, TaskPatch, TaskStore};

// Task responses mirror the storage service's wire format so the frontend
// can consume them unchanged.

/// GET /tasks - List all tasks
pub async fn list(Extension(auth_user): Extension<AuthUser>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = TaskStore::instance().list().await?;
    tracing::debug!("listed {} tasks for user {}", tasks.len(), auth_user.sub);
    Ok(Json(tasks))
}

/// POST /task - Create a task, stamped with the authenticated author
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(mut payload): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    payload.created_by = Some(TaskAuthor {
        name: auth_user.display_name(),
    });

    let created = TaskStore::instance().create(&payload).await?;
    tracing::debug!("task {} created by user {}", created.id, auth_user.sub);
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /task/:id - Rename a task and/or toggle its solved state
pub async fn update(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::bad_request("patch must set name and/or solved"));
    }

    let updated = TaskStore::instance().update(id, &patch).await?;
    tracing::debug!("task {} updated by user {}", id, auth_user.sub);
    Ok(Json(updated))
}
