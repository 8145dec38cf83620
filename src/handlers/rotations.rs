//! Rotation schedule reads. Any authenticated user may browse departments
//! and the rotation calendar.

use axum::extract::Extension;

use crate::domain::{Department, Rotation};
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

pub async fn list(Extension(state): Extension<AppState>) -> ApiResult<Vec<Rotation>> {
    let rotations = state.store.list_rotations().await?;
    Ok(ApiResponse::success(rotations))
}

pub async fn departments(Extension(state): Extension<AppState>) -> ApiResult<Vec<Department>> {
    let departments = state.store.list_departments().await?;
    Ok(ApiResponse::success(departments))
}
