//! Role predicate layer. Every operation checks its predicate before any
//! data access; a failed predicate surfaces as 403 Forbidden.

use uuid::Uuid;

use crate::domain::Role;
use crate::error::ApiError;
use crate::middleware::AuthUser;

pub fn is_trainer_or_admin(auth: &AuthUser) -> bool {
    auth.role == Role::Trainer || auth.is_staff
}

pub fn is_mentor(auth: &AuthUser) -> bool {
    auth.role == Role::Mentor
}

pub fn is_apprentice(auth: &AuthUser) -> bool {
    auth.role == Role::Apprentice
}

pub fn is_mentor_or_apprentice(auth: &AuthUser) -> bool {
    is_mentor(auth) || is_apprentice(auth)
}

/// Object-level check: the record's owning profile is the caller.
pub fn owns_record(auth: &AuthUser, owner_user_id: Uuid) -> bool {
    auth.user_id == owner_user_id
}

/// Object-level check for records carrying both a mentor and an apprentice
/// reference: the caller matches either side.
pub fn is_party_to(auth: &AuthUser, mentor_id: Uuid, apprentice_id: Uuid) -> bool {
    auth.user_id == mentor_id || auth.user_id == apprentice_id
}

pub fn require_trainer_or_admin(auth: &AuthUser) -> Result<(), ApiError> {
    if is_trainer_or_admin(auth) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Trainer or admin privilege required"))
    }
}

pub fn require_mentor(auth: &AuthUser) -> Result<(), ApiError> {
    if is_mentor(auth) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Mentor role required"))
    }
}

pub fn require_apprentice(auth: &AuthUser) -> Result<(), ApiError> {
    if is_apprentice(auth) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Apprentice role required"))
    }
}
