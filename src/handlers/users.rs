//! Profile CRUD for the three roles. Listings and mutations are gated on
//! trainer/admin; a profile owner may read their own detail. Deleting a
//! profile removes the linked user in the same transaction.

use axum::extract::{Extension, Path};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::password_digest;
use crate::domain::{ApprenticeProfile, MentorProfile, Role, TrainerProfile};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::store::{ApprenticeUpdate, MentorUpdate, NewUser, UserUpdate};
use crate::workflow::permissions;

#[derive(Debug, Deserialize)]
pub struct NewTrainerPayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewMentorPayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub trainer: Uuid,
    #[serde(default)]
    pub is_external: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewApprenticePayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub trainer: Uuid,
    pub mentor: Uuid,
}

/// Partial update shared by the three detail endpoints. User fields plus the
/// role-specific references; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdatePayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub trainer: Option<Uuid>,
    pub mentor: Option<Uuid>,
    pub project: Option<Uuid>,
    pub is_external: Option<bool>,
}

fn can_read_profile(auth: &AuthUser, owner: Uuid) -> Result<(), ApiError> {
    if permissions::is_trainer_or_admin(auth) || permissions::owns_record(auth, owner) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Trainer or admin privilege required"))
    }
}

fn trainer_view(profile: &TrainerProfile) -> Value {
    profile.user.to_view()
}

fn mentor_view(profile: &MentorProfile) -> Value {
    let mut view = profile.user.to_view();
    view["trainer"] = json!(profile.trainer_id);
    view["is_external"] = json!(profile.is_external);
    view["project"] = json!(profile.project_id);
    view
}

fn apprentice_view(profile: &ApprenticeProfile) -> Value {
    let mut view = profile.user.to_view();
    view["trainer"] = json!(profile.trainer_id);
    view["mentor"] = json!(profile.mentor_id);
    view["project"] = json!(profile.project_id);
    view
}

async fn user_update_from(
    state: &AppState,
    user_id: Uuid,
    payload: &ProfileUpdatePayload,
) -> Result<UserUpdate, ApiError> {
    let mut update = UserUpdate {
        email: payload.email.clone(),
        first_name: payload.first_name.clone(),
        last_name: payload.last_name.clone(),
        password_digest: None,
        is_active: payload.is_active,
    };
    if let Some(password) = &payload.password {
        // The digest is salted by email, so pick up the incoming email if the
        // same call changes it.
        let email = match &payload.email {
            Some(email) => email.clone(),
            None => {
                state
                    .store
                    .user_by_id(user_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("No such user"))?
                    .email
            }
        };
        update.password_digest = Some(password_digest(&email, password));
    }
    Ok(update)
}

fn has_user_fields(update: &UserUpdate) -> bool {
    update.email.is_some()
        || update.first_name.is_some()
        || update.last_name.is_some()
        || update.password_digest.is_some()
        || update.is_active.is_some()
}

// Trainers

pub async fn trainers_list(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Value>> {
    permissions::require_trainer_or_admin(&auth)?;
    let trainers = state.store.list_trainers().await?;
    Ok(ApiResponse::success(
        trainers.iter().map(trainer_view).collect(),
    ))
}

pub async fn trainers_create(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(payload): axum::Json<NewTrainerPayload>,
) -> ApiResult<Value> {
    permissions::require_trainer_or_admin(&auth)?;
    let digest = password_digest(&payload.email, &payload.password);
    let profile = state
        .store
        .create_trainer(NewUser {
            email: payload.email,
            password_digest: digest,
            first_name: payload.first_name,
            last_name: payload.last_name,
            is_staff: payload.is_staff,
        })
        .await?;
    Ok(ApiResponse::created(trainer_view(&profile)))
}

pub async fn trainers_get(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    can_read_profile(&auth, id)?;
    let profile = state
        .store
        .trainer_by_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such trainer"))?;
    Ok(ApiResponse::success(trainer_view(&profile)))
}

pub async fn trainers_update(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<ProfileUpdatePayload>,
) -> ApiResult<Value> {
    permissions::require_trainer_or_admin(&auth)?;
    state
        .store
        .trainer_by_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such trainer"))?;
    let update = user_update_from(&state, id, &payload).await?;
    let user = state.store.update_user(id, update).await?;
    Ok(ApiResponse::success(user.to_view()))
}

pub async fn trainers_delete(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    permissions::require_trainer_or_admin(&auth)?;
    state.store.delete_profile(Role::Trainer, id).await?;
    Ok(ApiResponse::<()>::no_content())
}

// Mentors

pub async fn mentors_list(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Value>> {
    permissions::require_trainer_or_admin(&auth)?;
    let mentors = state.store.list_mentors().await?;
    Ok(ApiResponse::success(
        mentors.iter().map(mentor_view).collect(),
    ))
}

pub async fn mentors_create(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(payload): axum::Json<NewMentorPayload>,
) -> ApiResult<Value> {
    permissions::require_trainer_or_admin(&auth)?;
    require_trainer(&state, payload.trainer).await?;
    let digest = password_digest(&payload.email, &payload.password);
    let profile = state
        .store
        .create_mentor(
            NewUser {
                email: payload.email,
                password_digest: digest,
                first_name: payload.first_name,
                last_name: payload.last_name,
                is_staff: false,
            },
            payload.trainer,
            payload.is_external,
        )
        .await?;
    Ok(ApiResponse::created(mentor_view(&profile)))
}

pub async fn mentors_get(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    can_read_profile(&auth, id)?;
    let profile = state
        .store
        .mentor_by_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such mentor"))?;
    Ok(ApiResponse::success(mentor_view(&profile)))
}

pub async fn mentors_update(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<ProfileUpdatePayload>,
) -> ApiResult<Value> {
    permissions::require_trainer_or_admin(&auth)?;
    state
        .store
        .mentor_by_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such mentor"))?;

    let update = user_update_from(&state, id, &payload).await?;
    if has_user_fields(&update) {
        state.store.update_user(id, update).await?;
    }
    let profile = state
        .store
        .update_mentor(
            id,
            MentorUpdate {
                trainer_id: payload.trainer,
                project_id: payload.project,
                is_external: payload.is_external,
            },
        )
        .await?;
    Ok(ApiResponse::success(mentor_view(&profile)))
}

pub async fn mentors_delete(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    permissions::require_trainer_or_admin(&auth)?;
    state.store.delete_profile(Role::Mentor, id).await?;
    Ok(ApiResponse::<()>::no_content())
}

// Apprentices

pub async fn apprentices_list(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Value>> {
    permissions::require_trainer_or_admin(&auth)?;
    let apprentices = state.store.list_apprentices().await?;
    Ok(ApiResponse::success(
        apprentices.iter().map(apprentice_view).collect(),
    ))
}

pub async fn apprentices_create(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    axum::Json(payload): axum::Json<NewApprenticePayload>,
) -> ApiResult<Value> {
    permissions::require_trainer_or_admin(&auth)?;
    require_trainer(&state, payload.trainer).await?;
    require_mentor(&state, payload.mentor).await?;
    let digest = password_digest(&payload.email, &payload.password);
    let profile = state
        .store
        .create_apprentice(
            NewUser {
                email: payload.email,
                password_digest: digest,
                first_name: payload.first_name,
                last_name: payload.last_name,
                is_staff: false,
            },
            payload.trainer,
            payload.mentor,
        )
        .await?;
    Ok(ApiResponse::created(apprentice_view(&profile)))
}

pub async fn apprentices_get(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    can_read_profile(&auth, id)?;
    let profile = state
        .store
        .apprentice_by_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such apprentice"))?;
    Ok(ApiResponse::success(apprentice_view(&profile)))
}

pub async fn apprentices_update(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<ProfileUpdatePayload>,
) -> ApiResult<Value> {
    permissions::require_trainer_or_admin(&auth)?;
    state
        .store
        .apprentice_by_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No such apprentice"))?;

    let update = user_update_from(&state, id, &payload).await?;
    if has_user_fields(&update) {
        state.store.update_user(id, update).await?;
    }
    let profile = state
        .store
        .update_apprentice(
            id,
            ApprenticeUpdate {
                trainer_id: payload.trainer,
                mentor_id: payload.mentor,
                project_id: payload.project,
            },
        )
        .await?;
    Ok(ApiResponse::success(apprentice_view(&profile)))
}

pub async fn apprentices_delete(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    permissions::require_trainer_or_admin(&auth)?;
    state.store.delete_profile(Role::Apprentice, id).await?;
    Ok(ApiResponse::<()>::no_content())
}

async fn require_trainer(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    if state.store.trainer_by_user(id).await?.is_none() {
        return Err(ApiError::validation_error(
            "Invalid reference",
            Some(
                [("trainer".to_string(), "No such record".to_string())]
                    .into_iter()
                    .collect(),
            ),
        ));
    }
    Ok(())
}

async fn require_mentor(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    if state.store.mentor_by_user(id).await?.is_none() {
        return Err(ApiError::validation_error(
            "Invalid reference",
            Some(
                [("mentor".to_string(), "No such record".to_string())]
                    .into_iter()
                    .collect(),
            ),
        ));
    }
    Ok(())
}
