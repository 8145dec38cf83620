pub mod pg;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    ApprenticeProfile, Department, Feedback, MentorProfile, Project, ProjectStatus, RequestDetail,
    RequestKind, RequestRecord, Role, Rotation, Task, TaskStatus, TrainerProfile, User,
};

/// Errors from the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub struct NewUser {
    pub email: String,
    pub password_digest: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_digest: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MentorUpdate {
    pub trainer_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub is_external: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApprenticeUpdate {
    pub trainer_id: Option<Uuid>,
    pub mentor_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub trainer_id: Option<Uuid>,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub status: ProjectStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub trainer_id: Option<Uuid>,
    pub is_external: Option<bool>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assigned_by: Uuid,
    pub assigned_to: Uuid,
    pub project_id: Uuid,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
pub struct NewFeedback {
    pub description: String,
    pub mentor_id: Uuid,
    pub apprentice_id: Uuid,
    pub project_id: Uuid,
    #[serde(default = "default_satisfied")]
    pub satisfied: bool,
}

fn default_satisfied() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackUpdate {
    pub description: Option<String>,
    pub satisfied: Option<bool>,
}

/// Creation input for an approvable request. Status is not part of the
/// input: every new request is persisted as pending.
pub struct NewRequest {
    pub requester_id: Uuid,
    pub reason: String,
    pub detail: RequestDetail,
}

/// Status filter for request listings: pending, or processed
/// (approved + rejected).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Pending,
    Processed,
}

/// Row scope for task listings, derived from the caller's role.
#[derive(Debug, Clone, Copy)]
pub enum TaskScope {
    All,
    AssignedBy(Uuid),
    AssignedTo(Uuid),
}

#[derive(Debug, Clone, Copy)]
pub enum FeedbackScope {
    Mentor(Uuid),
    Apprentice(Uuid),
    Project(Uuid),
}

/// Transactional record store the workflow layer runs against. Production
/// uses [`pg::PgStore`]; tests use an in-memory implementation.
#[async_trait]
pub trait Store: Send + Sync {
    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    // Principals and profiles
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, StoreError>;

    async fn list_trainers(&self) -> Result<Vec<TrainerProfile>, StoreError>;
    async fn list_mentors(&self) -> Result<Vec<MentorProfile>, StoreError>;
    async fn list_apprentices(&self) -> Result<Vec<ApprenticeProfile>, StoreError>;

    async fn trainer_by_user(&self, user_id: Uuid) -> Result<Option<TrainerProfile>, StoreError>;
    async fn mentor_by_user(&self, user_id: Uuid) -> Result<Option<MentorProfile>, StoreError>;
    async fn apprentice_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ApprenticeProfile>, StoreError>;

    async fn create_trainer(&self, user: NewUser) -> Result<TrainerProfile, StoreError>;
    async fn create_mentor(
        &self,
        user: NewUser,
        trainer_id: Uuid,
        is_external: bool,
    ) -> Result<MentorProfile, StoreError>;
    async fn create_apprentice(
        &self,
        user: NewUser,
        trainer_id: Uuid,
        mentor_id: Uuid,
    ) -> Result<ApprenticeProfile, StoreError>;

    async fn update_mentor(
        &self,
        user_id: Uuid,
        update: MentorUpdate,
    ) -> Result<MentorProfile, StoreError>;
    async fn update_apprentice(
        &self,
        user_id: Uuid,
        update: ApprenticeUpdate,
    ) -> Result<ApprenticeProfile, StoreError>;

    /// Deletes the role profile and its owning user in the same transaction.
    async fn delete_profile(&self, role: Role, user_id: Uuid) -> Result<(), StoreError>;

    // Projects
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
    async fn project_by_id(&self, id: Uuid) -> Result<Option<Project>, StoreError>;
    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError>;
    async fn update_project(&self, id: Uuid, update: ProjectUpdate)
        -> Result<Project, StoreError>;
    async fn delete_project(&self, id: Uuid) -> Result<(), StoreError>;

    // Tasks
    async fn list_tasks(&self, scope: TaskScope) -> Result<Vec<Task>, StoreError>;
    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;
    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError>;
    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Task, StoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError>;

    // Feedback
    async fn feedback_by_id(&self, id: Uuid) -> Result<Option<Feedback>, StoreError>;
    async fn list_feedback(&self, scope: FeedbackScope) -> Result<Vec<Feedback>, StoreError>;
    async fn create_feedback(&self, feedback: NewFeedback) -> Result<Feedback, StoreError>;
    async fn update_feedback(
        &self,
        id: Uuid,
        update: FeedbackUpdate,
    ) -> Result<Feedback, StoreError>;

    // Rotation
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError>;
    async fn department_by_id(&self, id: Uuid) -> Result<Option<Department>, StoreError>;
    async fn list_rotations(&self) -> Result<Vec<Rotation>, StoreError>;

    // Approvable requests
    /// Requests of one kind, newest first. No cross-kind ordering exists;
    /// callers concatenate per-kind listings.
    async fn list_requests(
        &self,
        kind: RequestKind,
        filter: Option<StatusFilter>,
    ) -> Result<Vec<RequestRecord>, StoreError>;
    async fn request_by_id(
        &self,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<Option<RequestRecord>, StoreError>;
    /// Persists a new pending request. Join requests enforce uniqueness on
    /// (apprentice, project, status) and surface violations as `Conflict`.
    async fn insert_request(&self, request: NewRequest) -> Result<RequestRecord, StoreError>;
    async fn update_request(&self, record: &RequestRecord) -> Result<(), StoreError>;

    /// Whether the mentor's user is linked as the apprentice's assigned
    /// mentor for the given project.
    async fn mentor_assigned(
        &self,
        mentor_user_id: Uuid,
        apprentice_id: Uuid,
        project_id: Uuid,
    ) -> Result<bool, StoreError>;
}
