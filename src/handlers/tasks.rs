//! Task endpoints. Listings are scoped by role: trainers and staff see every
//! task, mentors see tasks they assigned, apprentices see tasks assigned to
//! them. Apprentices cannot create or delete tasks.

use axum::extract::{Extension, Path};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Role, Task, TaskStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::store::{NewTask, TaskScope, TaskUpdate};
use crate::workflow::permissions;

#[derive(Debug, Deserialize)]
pub struct NewTaskPayload {
    pub title: String,
    pub description: String,
    pub assigned_to: Uuid,
    pub project: Uuid,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: TaskStatus,
}

fn scope_for(auth: &AuthUser) -> TaskScope {
    if permissions::is_trainer_or_admin(auth) {
        TaskScope::All
    } else if auth.role == Role::Mentor {
        TaskScope::AssignedBy(auth.user_id)
    } else {
        TaskScope::AssignedTo(auth.user_id)
    }
}

fn can_manage(auth: &AuthUser, task: &Task) -> bool {
    permissions::is_trainer_or_admin(auth) || permissions::owns_record(auth, task.assigned_by)
}

pub async fn list(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Task>> {
    let tasks = state.store.list_tasks(scope_for(&auth)).await?;
    Ok(ApiResponse::success(tasks))
}

pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(payload): axum::Json<NewTaskPayload>,
) -> ApiResult<Task> {
    if permissions::is_apprentice(&auth) {
        return Err(ApiError::forbidden("Apprentices cannot create tasks"));
    }
    require_apprentice(&state, payload.assigned_to).await?;
    require_project(&state, payload.project).await?;

    let task = state
        .store
        .create_task(NewTask {
            title: payload.title,
            description: payload.description,
            assigned_by: auth.user_id,
            assigned_to: payload.assigned_to,
            project_id: payload.project,
            due_date: payload.due_date,
            status: payload.status,
        })
        .await?;
    tracing::info!(task = %task.id, assignee = %task.assigned_to, "task created");
    Ok(ApiResponse::created(task))
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Task> {
    let task = state
        .store
        .task_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such task"))?;
    if !can_manage(&auth, &task) && !permissions::owns_record(&auth, task.assigned_to) {
        return Err(ApiError::forbidden("Not a participant on this task"));
    }
    Ok(ApiResponse::success(task))
}

pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<TaskUpdate>,
) -> ApiResult<Task> {
    let task = state
        .store
        .task_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such task"))?;
    if !can_manage(&auth, &task) {
        return Err(ApiError::forbidden("Only the assigner can update a task"));
    }
    let task = state.store.update_task(id, payload).await?;
    Ok(ApiResponse::success(task))
}

pub async fn delete(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let task = state
        .store
        .task_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such task"))?;
    if !can_manage(&auth, &task) {
        return Err(ApiError::forbidden("Only the assigner can delete a task"));
    }
    state.store.delete_task(id).await?;
    Ok(ApiResponse::<()>::no_content())
}

async fn require_apprentice(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    if state.store.apprentice_by_user(id).await?.is_none() {
        return Err(ApiError::validation_error(
            "Invalid reference",
            Some(
                [("assigned_to".to_string(), "No such record".to_string())]
                    .into_iter()
                    .collect(),
            ),
        ));
    }
    Ok(())
}

async fn require_project(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    if state.store.project_by_id(id).await?.is_none() {
        return Err(ApiError::validation_error(
            "Invalid reference",
            Some(
                [("project".to_string(), "No such record".to_string())]
                    .into_iter()
                    .collect(),
            ),
        ));
    }
    Ok(())
}
