//! Feedback endpoints. Mentors write feedback about their apprentices; the
//! detail view is visible to either party and to trainers/staff.

use axum::extract::{Extension, Path};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::Feedback;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::store::{FeedbackScope, FeedbackUpdate, NewFeedback};
use crate::workflow::permissions;

#[derive(Debug, Deserialize)]
pub struct NewFeedbackPayload {
    pub description: String,
    pub apprentice: Uuid,
    pub project: Uuid,
    #[serde(default = "default_satisfied")]
    pub satisfied: bool,
}

fn default_satisfied() -> bool {
    true
}

/// GET /api/v1/feedback/ - feedback written by the calling mentor
pub async fn list(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Feedback>> {
    permissions::require_mentor(&auth)?;
    let rows = state
        .store
        .list_feedback(FeedbackScope::Mentor(auth.user_id))
        .await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/v1/feedback/ - the mentor reference is always the caller
pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(payload): axum::Json<NewFeedbackPayload>,
) -> ApiResult<Feedback> {
    permissions::require_mentor(&auth)?;
    require_apprentice(&state, payload.apprentice).await?;
    require_project(&state, payload.project).await?;

    let feedback = state
        .store
        .create_feedback(NewFeedback {
            description: payload.description,
            mentor_id: auth.user_id,
            apprentice_id: payload.apprentice,
            project_id: payload.project,
            satisfied: payload.satisfied,
        })
        .await?;
    Ok(ApiResponse::created(feedback))
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Feedback> {
    let feedback = state
        .store
        .feedback_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such feedback"))?;
    if !permissions::is_trainer_or_admin(&auth)
        && !permissions::is_party_to(&auth, feedback.mentor_id, feedback.apprentice_id)
    {
        return Err(ApiError::forbidden("Not a party to this feedback"));
    }
    Ok(ApiResponse::success(feedback))
}

/// PUT /api/v1/feedback/:id/ - only the authoring mentor may edit
pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<FeedbackUpdate>,
) -> ApiResult<Feedback> {
    let feedback = state
        .store
        .feedback_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such feedback"))?;
    if !permissions::is_trainer_or_admin(&auth)
        && !permissions::owns_record(&auth, feedback.mentor_id)
    {
        return Err(ApiError::forbidden("Only the author can edit feedback"));
    }
    let feedback = state.store.update_feedback(id, payload).await?;
    Ok(ApiResponse::success(feedback))
}

/// GET /api/v1/feedback/project/:id/ - trainer/admin overview per project
pub async fn by_project(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Feedback>> {
    permissions::require_trainer_or_admin(&auth)?;
    let rows = state.store.list_feedback(FeedbackScope::Project(id)).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/v1/feedback/apprentice/:id/ - the apprentice themself or a
/// trainer/admin
pub async fn by_apprentice(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Feedback>> {
    if !permissions::is_trainer_or_admin(&auth) && !permissions::owns_record(&auth, id) {
        return Err(ApiError::forbidden("Not a party to this feedback"));
    }
    let rows = state
        .store
        .list_feedback(FeedbackScope::Apprentice(id))
        .await?;
    Ok(ApiResponse::success(rows))
}

async fn require_apprentice(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    if state.store.apprentice_by_user(id).await?.is_none() {
        return Err(ApiError::validation_error(
            "Invalid reference",
            Some(
                [("apprentice".to_string(), "No such record".to_string())]
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
