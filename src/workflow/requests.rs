//! Approvable-request dispatch workflow: list, review, and per-kind
//! creation. All operations run against the [`Store`] seam and gate on the
//! role predicate layer before touching any data.

use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::request::{RequestDetail, RequestKind, RequestStatus, RequestView};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::store::{NewRequest, StatusFilter, Store};
use crate::workflow::permissions;

/// Review body for the approve endpoint.
#[derive(Debug, Deserialize)]
pub struct ReviewAction {
    pub status: String,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequestInput {
    pub apprentice: Uuid,
    pub project: Uuid,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequestInput {
    pub apprentice: Uuid,
    pub project: Uuid,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RotationChangeInput {
    pub apprentice: Uuid,
    pub from_department: Uuid,
    pub to_department: Uuid,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct MentorLeaveInput {
    pub mentor: Uuid,
    pub project: Uuid,
    #[serde(default)]
    pub reason: String,
}

/// The mentor is never taken from the payload: it is always the caller's
/// own mentor profile.
#[derive(Debug, Deserialize)]
pub struct ApprenticeRemovalInput {
    pub apprentice: Uuid,
    pub project: Uuid,
    #[serde(default)]
    pub reason: String,
}

/// All requests across the five kinds, trainer/admin only. Each kind is
/// listed newest-first; no ordering is guaranteed across kinds.
pub async fn list_all(
    store: &dyn Store,
    auth: &AuthUser,
    filter: Option<StatusFilter>,
) -> Result<Vec<RequestView>, ApiError> {
    permissions::require_trainer_or_admin(auth)?;

    let mut views = Vec::new();
    for kind in RequestKind::ALL {
        let records = store.list_requests(kind, filter).await?;
        views.extend(records.iter().map(|r| r.to_view()));
    }
    Ok(views)
}

/// Approve or reject a request, trainer/admin only. Writing the same
/// terminal status twice is allowed and simply rewrites the review fields.
pub async fn approve(
    store: &dyn Store,
    auth: &AuthUser,
    tag: &str,
    id: Uuid,
    action: ReviewAction,
) -> Result<RequestView, ApiError> {
    permissions::require_trainer_or_admin(auth)?;

    let kind = RequestKind::from_tag(tag)
        .ok_or_else(|| ApiError::not_found(format!("Unknown request kind: {}", tag)))?;

    let mut record = store
        .request_by_id(kind, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} request {} not found", tag, id)))?;

    let status = action
        .status
        .parse::<RequestStatus>()
        .ok()
        .filter(RequestStatus::is_terminal)
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

    record.status = status;
    record.reviewed_by_id = Some(auth.user_id);
    record.admin_notes = action.admin_notes.unwrap_or_default();
    record.updated_at = Utc::now();
    store.update_request(&record).await?;

    tracing::info!(
        kind = tag,
        request_id = %id,
        status = status.as_str(),
        reviewer = %auth.user_id,
        "request reviewed"
    );
    Ok(record.to_view())
}

pub async fn create_join(
    store: &dyn Store,
    auth: &AuthUser,
    input: JoinRequestInput,
) -> Result<RequestView, ApiError> {
    permissions::require_apprentice(auth)?;
    require_apprentice_exists(store, input.apprentice).await?;
    require_project_exists(store, input.project).await?;

    submit(
        store,
        auth,
        input.reason,
        RequestDetail::ProjectJoin {
            apprentice_id: input.apprentice,
            project_id: input.project,
        },
    )
    .await
}

pub async fn create_leave(
    store: &dyn Store,
    auth: &AuthUser,
    input: LeaveRequestInput,
) -> Result<RequestView, ApiError> {
    permissions::require_apprentice(auth)?;
    require_apprentice_exists(store, input.apprentice).await?;
    require_project_exists(store, input.project).await?;

    submit(
        store,
        auth,
        input.reason,
        RequestDetail::ProjectLeave {
            apprentice_id: input.apprentice,
            project_id: input.project,
        },
    )
    .await
}

pub async fn create_rotation_change(
    store: &dyn Store,
    auth: &AuthUser,
    input: RotationChangeInput,
) -> Result<RequestView, ApiError> {
    permissions::require_apprentice(auth)?;
    require_apprentice_exists(store, input.apprentice).await?;
    require_department_exists(store, input.from_department, "from_department").await?;
    require_department_exists(store, input.to_department, "to_department").await?;

    submit(
        store,
        auth,
        input.reason,
        RequestDetail::RotationChange {
            apprentice_id: input.apprentice,
            from_department_id: input.from_department,
            to_department_id: input.to_department,
        },
    )
    .await
}

pub async fn create_mentor_leave(
    store: &dyn Store,
    auth: &AuthUser,
    input: MentorLeaveInput,
) -> Result<RequestView, ApiError> {
    permissions::require_mentor(auth)?;
    require_mentor_exists(store, input.mentor).await?;
    require_project_exists(store, input.project).await?;

    submit(
        store,
        auth,
        input.reason,
        RequestDetail::MentorLeave {
            mentor_id: input.mentor,
            project_id: input.project,
        },
    )
    .await
}

pub async fn create_apprentice_removal(
    store: &dyn Store,
    auth: &AuthUser,
    input: ApprenticeRemovalInput,
) -> Result<RequestView, ApiError> {
    if !permissions::is_mentor(auth) {
        return Err(ApiError::forbidden(
            "Only mentors can create removal requests.",
        ));
    }
    let mentor = store
        .mentor_by_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("Only mentors can create removal requests."))?;

    require_apprentice_exists(store, input.apprentice).await?;
    require_project_exists(store, input.project).await?;

    if !store
        .mentor_assigned(mentor.user.id, input.apprentice, input.project)
        .await?
    {
        return Err(ApiError::validation_error(
            "You can only request removal for apprentices assigned to you on this project.",
            None,
        ));
    }

    submit(
        store,
        auth,
        input.reason,
        RequestDetail::ApprenticeRemoval {
            mentor_id: mentor.user.id,
            apprentice_id: input.apprentice,
            project_id: input.project,
        },
    )
    .await
}

/// Persist a new request. Status is forced to pending here regardless of
/// anything a client payload carried.
async fn submit(
    store: &dyn Store,
    auth: &AuthUser,
    reason: String,
    detail: RequestDetail,
) -> Result<RequestView, ApiError> {
    let kind = detail.kind();
    let record = store
        .insert_request(NewRequest {
            requester_id: auth.user_id,
            reason,
            detail,
        })
        .await?;
    tracing::info!(
        kind = kind.tag(),
        request_id = %record.id,
        requester = %auth.user_id,
        "request created"
    );
    Ok(record.to_view())
}

async fn require_apprentice_exists(store: &dyn Store, id: Uuid) -> Result<(), ApiError> {
    if store.apprentice_by_user(id).await?.is_none() {
        return Err(missing_field("apprentice"));
    }
    Ok(())
}

async fn require_mentor_exists(store: &dyn Store, id: Uuid) -> Result<(), ApiError> {
    if store.mentor_by_user(id).await?.is_none() {
        return Err(missing_field("mentor"));
    }
    Ok(())
}

async fn require_project_exists(store: &dyn Store, id: Uuid) -> Result<(), ApiError> {
    if store.project_by_id(id).await?.is_none() {
        return Err(missing_field("project"));
    }
    Ok(())
}

async fn require_department_exists(
    store: &dyn Store,
    id: Uuid,
    field: &str,
) -> Result<(), ApiError> {
    if store.department_by_id(id).await?.is_none() {
        return Err(missing_field(field));
    }
    Ok(())
}

fn missing_field(field: &str) -> ApiError {
    let mut field_errors = HashMap::new();
    field_errors.insert(field.to_string(), "No such record".to_string());
    ApiError::validation_error("Invalid reference", Some(field_errors))
}
