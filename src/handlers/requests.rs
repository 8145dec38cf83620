//! HTTP surface for the approvable-request workflow. Thin wrappers: the role
//! gates, validation, and persistence all live in `workflow::requests`.

use axum::extract::{Extension, Path};
use uuid::Uuid;

use crate::domain::request::RequestView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::store::StatusFilter;
use crate::workflow::requests as workflow;
use crate::workflow::requests::{
    ApprenticeRemovalInput, JoinRequestInput, LeaveRequestInput, MentorLeaveInput, ReviewAction,
    RotationChangeInput,
};

pub async fn list_all(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<RequestView>> {
    let views = workflow::list_all(state.store.as_ref(), &auth, None).await?;
    Ok(ApiResponse::success(views))
}

pub async fn list_pending(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<RequestView>> {
    let views =
        workflow::list_all(state.store.as_ref(), &auth, Some(StatusFilter::Pending)).await?;
    Ok(ApiResponse::success(views))
}

pub async fn list_processed(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<RequestView>> {
    let views =
        workflow::list_all(state.store.as_ref(), &auth, Some(StatusFilter::Processed)).await?;
    Ok(ApiResponse::success(views))
}

/// A non-UUID id is rejected as 400 by the path extractor before the
/// workflow runs; only a well-formed but unknown id reaches the 404 path.
pub async fn approve(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((kind, id)): Path<(String, Uuid)>,
    axum::Json(action): axum::Json<ReviewAction>,
) -> ApiResult<RequestView> {
    let view = workflow::approve(state.store.as_ref(), &auth, &kind, id, action).await?;
    Ok(ApiResponse::success(view))
}

pub async fn create_join(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(input): axum::Json<JoinRequestInput>,
) -> ApiResult<RequestView> {
    let view = workflow::create_join(state.store.as_ref(), &auth, input).await?;
    Ok(ApiResponse::created(view))
}

pub async fn create_leave(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(input): axum::Json<LeaveRequestInput>,
) -> ApiResult<RequestView> {
    let view = workflow::create_leave(state.store.as_ref(), &auth, input).await?;
    Ok(ApiResponse::created(view))
}

pub async fn create_rotation_change(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(input): axum::Json<RotationChangeInput>,
) -> ApiResult<RequestView> {
    let view = workflow::create_rotation_change(state.store.as_ref(), &auth, input).await?;
    Ok(ApiResponse::created(view))
}

pub async fn create_mentor_leave(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(input): axum::Json<MentorLeaveInput>,
) -> ApiResult<RequestView> {
    let view = workflow::create_mentor_leave(state.store.as_ref(), &auth, input).await?;
    Ok(ApiResponse::created(view))
}

pub async fn create_apprentice_removal(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(input): axum::Json<ApprenticeRemovalInput>,
) -> ApiResult<RequestView> {
    let view = workflow::create_apprentice_removal(state.store.as_ref(), &auth, input).await?;
    Ok(ApiResponse::created(view))
}
