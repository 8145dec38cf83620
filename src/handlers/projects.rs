//! Project CRUD. Reads are open to any authenticated user; mutations are
//! trainer/admin only.

use axum::extract::{Extension, Path};
use uuid::Uuid;

use crate::domain::Project;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::store::{NewProject, ProjectUpdate};
use crate::workflow::permissions;

pub async fn list(Extension(state): Extension<AppState>) -> ApiResult<Vec<Project>> {
    let projects = state.store.list_projects().await?;
    Ok(ApiResponse::success(projects))
}

pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(payload): axum::Json<NewProject>,
) -> ApiResult<Project> {
    permissions::require_trainer_or_admin(&auth)?;
    let project = state.store.create_project(payload).await?;
    tracing::info!(project = %project.id, "project created");
    Ok(ApiResponse::created(project))
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Project> {
    let project = state
        .store
        .project_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such project"))?;
    Ok(ApiResponse::success(project))
}

pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<ProjectUpdate>,
) -> ApiResult<Project> {
    permissions::require_trainer_or_admin(&auth)?;
    let project = state.store.update_project(id, payload).await?;
    Ok(ApiResponse::success(project))
}

pub async fn delete(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    permissions::require_trainer_or_admin(&auth)?;
    state.store.delete_project(id).await?;
    Ok(ApiResponse::<()>::no_content())
}
