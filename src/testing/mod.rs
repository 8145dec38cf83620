//! In-memory store double and fixtures for unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::request::{RequestDetail, RequestKind, RequestRecord, RequestStatus};
use crate::domain::{
    ApprenticeProfile, Department, Feedback, MentorProfile, Project, ProjectStatus, Role, Rotation,
    Task, TrainerProfile, User,
};
use crate::middleware::AuthUser;
use crate::store::{
    ApprenticeUpdate, FeedbackScope, FeedbackUpdate, MentorUpdate, NewFeedback, NewProject,
    NewRequest, NewTask, NewUser, ProjectUpdate, StatusFilter, Store, StoreError, TaskScope,
    TaskUpdate, UserUpdate,
};

#[derive(Debug, Clone, Default)]
struct MentorRecord {
    trainer_id: Uuid,
    is_external: bool,
    project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
struct ApprenticeRecord {
    trainer_id: Option<Uuid>,
    mentor_id: Option<Uuid>,
    project_id: Option<Uuid>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    trainers: Vec<Uuid>,
    mentors: HashMap<Uuid, MentorRecord>,
    apprentices: HashMap<Uuid, ApprenticeRecord>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
    feedback: HashMap<Uuid, Feedback>,
    departments: HashMap<Uuid, Department>,
    rotations: Vec<Rotation>,
    // Insertion order per kind; listings iterate in reverse, which matches
    // created_at-descending because timestamps are non-decreasing.
    requests: HashMap<RequestKind, Vec<RequestRecord>>,
}

/// HashMap-backed [`Store`] used by workflow and handler tests. Counts
/// request reads so tests can assert an operation never touched the store.
#[derive(Default)]
pub struct MemStore {
    inner: RwLock<Inner>,
    request_reads: AtomicUsize,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_reads(&self) -> usize {
        self.request_reads.load(Ordering::SeqCst)
    }

    fn make_user(&self, email: &str, role: Role, is_staff: bool) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            first_name: "Test".into(),
            last_name: "User".into(),
            password_digest: String::new(),
            role,
            is_staff,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_trainer(&self, email: &str) -> Uuid {
        let user = self.make_user(email, Role::Trainer, false);
        let id = user.id;
        let mut inner = self.inner.write().unwrap();
        inner.users.insert(id, user);
        inner.trainers.push(id);
        id
    }

    pub fn add_mentor(&self, email: &str, trainer_id: Uuid, project_id: Option<Uuid>) -> Uuid {
        let user = self.make_user(email, Role::Mentor, false);
        let id = user.id;
        let mut inner = self.inner.write().unwrap();
        inner.users.insert(id, user);
        inner.mentors.insert(
            id,
            MentorRecord {
                trainer_id,
                is_external: false,
                project_id,
            },
        );
        id
    }

    pub fn add_apprentice(
        &self,
        email: &str,
        trainer_id: Uuid,
        mentor_id: Option<Uuid>,
        project_id: Option<Uuid>,
    ) -> Uuid {
        let user = self.make_user(email, Role::Apprentice, false);
        let id = user.id;
        let mut inner = self.inner.write().unwrap();
        inner.users.insert(id, user);
        inner.apprentices.insert(
            id,
            ApprenticeRecord {
                trainer_id: Some(trainer_id),
                mentor_id,
                project_id,
            },
        );
        id
    }

    pub fn add_project(&self, name: &str) -> Uuid {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            start_date: now.date_naive(),
            end_date: None,
            trainer_id: None,
            is_external: false,
            status: ProjectStatus::InProgress,
            created_at: now,
            updated_at: now,
        };
        let id = project.id;
        self.inner.write().unwrap().projects.insert(id, project);
        id
    }

    pub fn add_department(&self, name: &str) -> Uuid {
        let now = Utc::now();
        let department = Department {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        let id = department.id;
        self.inner
            .write()
            .unwrap()
            .departments
            .insert(id, department);
        id
    }

    fn profile_view(inner: &Inner, user_id: Uuid) -> Option<User> {
        inner.users.get(&user_id).cloned()
    }

    fn mentor_view(inner: &Inner, user_id: Uuid) -> Option<MentorProfile> {
        let record = inner.mentors.get(&user_id)?;
        Some(MentorProfile {
            user: Self::profile_view(inner, user_id)?,
            trainer_id: record.trainer_id,
            is_external: record.is_external,
            project_id: record.project_id,
        })
    }

    fn apprentice_view(inner: &Inner, user_id: Uuid) -> Option<ApprenticeProfile> {
        let record = inner.apprentices.get(&user_id)?;
        Some(ApprenticeProfile {
            user: Self::profile_view(inner, user_id)?,
            trainer_id: record.trainer_id,
            mentor_id: record.mentor_id,
            project_id: record.project_id,
        })
    }
}

/// Authenticated principal for a seeded user.
pub fn auth_as(store: &MemStore, user_id: Uuid) -> AuthUser {
    let inner = store.inner.read().unwrap();
    let user = inner.users.get(&user_id).expect("user not seeded");
    AuthUser {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
        is_staff: user.is_staff,
    }
}

/// Free-standing principal that may not exist in the store at all.
pub fn auth_with_role(role: Role, is_staff: bool) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        email: format!("{}@example.com", role),
        role,
        is_staff,
    }
}

#[async_trait]
impl Store for MemStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().unwrap().users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {} not found", id)))?;
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(digest) = update.password_digest {
            user.password_digest = digest;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list_trainers(&self) -> Result<Vec<TrainerProfile>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .trainers
            .iter()
            .filter_map(|id| Self::profile_view(&inner, *id))
            .map(|user| TrainerProfile { user })
            .collect())
    }

    async fn list_mentors(&self) -> Result<Vec<MentorProfile>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<Uuid> = inner.mentors.keys().copied().collect();
        ids.sort();
        Ok(ids
            .into_iter()
            .filter_map(|id| Self::mentor_view(&inner, id))
            .collect())
    }

    async fn list_apprentices(&self) -> Result<Vec<ApprenticeProfile>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<Uuid> = inner.apprentices.keys().copied().collect();
        ids.sort();
        Ok(ids
            .into_iter()
            .filter_map(|id| Self::apprentice_view(&inner, id))
            .collect())
    }

    async fn trainer_by_user(&self, user_id: Uuid) -> Result<Option<TrainerProfile>, StoreError> {
        let inner = self.inner.read().unwrap();
        if !inner.trainers.contains(&user_id) {
            return Ok(None);
        }
        Ok(Self::profile_view(&inner, user_id).map(|user| TrainerProfile { user }))
    }

    async fn mentor_by_user(&self, user_id: Uuid) -> Result<Option<MentorProfile>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(Self::mentor_view(&inner, user_id))
    }

    async fn apprentice_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ApprenticeProfile>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(Self::apprentice_view(&inner, user_id))
    }

    async fn create_trainer(&self, user: NewUser) -> Result<TrainerProfile, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(
                "A user with this email already exists".into(),
            ));
        }
        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_digest: user.password_digest,
            role: Role::Trainer,
            is_staff: user.is_staff,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.trainers.push(record.id);
        inner.users.insert(record.id, record.clone());
        Ok(TrainerProfile { user: record })
    }

    async fn create_mentor(
        &self,
        user: NewUser,
        trainer_id: Uuid,
        is_external: bool,
    ) -> Result<MentorProfile, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(
                "A user with this email already exists".into(),
            ));
        }
        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_digest: user.password_digest,
            role: Role::Mentor,
            is_staff: user.is_staff,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.mentors.insert(
            record.id,
            MentorRecord {
                trainer_id,
                is_external,
                project_id: None,
            },
        );
        inner.users.insert(record.id, record.clone());
        Ok(MentorProfile {
            user: record,
            trainer_id,
            is_external,
            project_id: None,
        })
    }

    async fn create_apprentice(
        &self,
        user: NewUser,
        trainer_id: Uuid,
        mentor_id: Uuid,
    ) -> Result<ApprenticeProfile, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(
                "A user with this email already exists".into(),
            ));
        }
        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_digest: user.password_digest,
            role: Role::Apprentice,
            is_staff: user.is_staff,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.apprentices.insert(
            record.id,
            ApprenticeRecord {
                trainer_id: Some(trainer_id),
                mentor_id: Some(mentor_id),
                project_id: None,
            },
        );
        inner.users.insert(record.id, record.clone());
        Ok(ApprenticeProfile {
            user: record,
            trainer_id: Some(trainer_id),
            mentor_id: Some(mentor_id),
            project_id: None,
        })
    }

    async fn update_mentor(
        &self,
        user_id: Uuid,
        update: MentorUpdate,
    ) -> Result<MentorProfile, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let record = inner
            .mentors
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("mentor {} not found", user_id)))?;
        if let Some(trainer_id) = update.trainer_id {
            record.trainer_id = trainer_id;
        }
        if let Some(project_id) = update.project_id {
            record.project_id = Some(project_id);
        }
        if let Some(is_external) = update.is_external {
            record.is_external = is_external;
        }
        Self::mentor_view(&inner, user_id)
            .ok_or_else(|| StoreError::NotFound(format!("mentor {} not found", user_id)))
    }

    async fn update_apprentice(
        &self,
        user_id: Uuid,
        update: ApprenticeUpdate,
    ) -> Result<ApprenticeProfile, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let record = inner
            .apprentices
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("apprentice {} not found", user_id)))?;
        if let Some(trainer_id) = update.trainer_id {
            record.trainer_id = Some(trainer_id);
        }
        if let Some(mentor_id) = update.mentor_id {
            record.mentor_id = Some(mentor_id);
        }
        if let Some(project_id) = update.project_id {
            record.project_id = Some(project_id);
        }
        Self::apprentice_view(&inner, user_id)
            .ok_or_else(|| StoreError::NotFound(format!("apprentice {} not found", user_id)))
    }

    async fn delete_profile(&self, role: Role, user_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        let existed = match role {
            Role::Trainer => {
                let len = inner.trainers.len();
                inner.trainers.retain(|id| *id != user_id);
                inner.trainers.len() != len
            }
            Role::Mentor => inner.mentors.remove(&user_id).is_some(),
            Role::Apprentice => inner.apprentices.remove(&user_id).is_some(),
        };
        if !existed {
            return Err(StoreError::NotFound(format!(
                "{} profile {} not found",
                role, user_id
            )));
        }
        inner.users.remove(&user_id);
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut projects: Vec<Project> = inner.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn project_by_id(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.inner.read().unwrap().projects.get(&id).cloned())
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let record = Project {
            id: Uuid::new_v4(),
            name: project.name,
            description: project.description,
            start_date: project.start_date.unwrap_or_else(|| now.date_naive()),
            end_date: project.end_date,
            trainer_id: project.trainer_id,
            is_external: project.is_external,
            status: project.status,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .unwrap()
            .projects
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_project(
        &self,
        id: Uuid,
        update: ProjectUpdate,
    ) -> Result<Project, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let project = inner
            .projects
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("project {} not found", id)))?;
        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        if let Some(start_date) = update.start_date {
            project.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            project.end_date = Some(end_date);
        }
        if let Some(trainer_id) = update.trainer_id {
            project.trainer_id = Some(trainer_id);
        }
        if let Some(is_external) = update.is_external {
            project.is_external = is_external;
        }
        if let Some(status) = update.status {
            project.status = status;
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner
            .write()
            .unwrap()
            .projects
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("project {} not found", id)))
    }

    async fn list_tasks(&self, scope: TaskScope) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| match scope {
                TaskScope::All => true,
                TaskScope::AssignedBy(id) => t.assigned_by == id,
                TaskScope::AssignedTo(id) => t.assigned_to == id,
            })
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.inner.read().unwrap().tasks.get(&id).cloned())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let now = Utc::now();
        let record = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            assigned_by: task.assigned_by,
            assigned_to: task.assigned_to,
            project_id: task.project_id,
            due_date: task.due_date,
            completed_at: None,
            status: task.status,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .unwrap()
            .tasks
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let task = inner
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("task {} not found", id)))?;
        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(completed_at) = update.completed_at {
            task.completed_at = Some(completed_at);
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner
            .write()
            .unwrap()
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("task {} not found", id)))
    }

    async fn feedback_by_id(&self, id: Uuid) -> Result<Option<Feedback>, StoreError> {
        Ok(self.inner.read().unwrap().feedback.get(&id).cloned())
    }

    async fn list_feedback(&self, scope: FeedbackScope) -> Result<Vec<Feedback>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut rows: Vec<Feedback> = inner
            .feedback
            .values()
            .filter(|f| match scope {
                FeedbackScope::Mentor(id) => f.mentor_id == id,
                FeedbackScope::Apprentice(id) => f.apprentice_id == id,
                FeedbackScope::Project(id) => f.project_id == id,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_feedback(&self, feedback: NewFeedback) -> Result<Feedback, StoreError> {
        let now = Utc::now();
        let record = Feedback {
            id: Uuid::new_v4(),
            description: feedback.description,
            mentor_id: feedback.mentor_id,
            apprentice_id: feedback.apprentice_id,
            project_id: feedback.project_id,
            satisfied: feedback.satisfied,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .unwrap()
            .feedback
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_feedback(
        &self,
        id: Uuid,
        update: FeedbackUpdate,
    ) -> Result<Feedback, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let feedback = inner
            .feedback
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("feedback {} not found", id)))?;
        if let Some(description) = update.description {
            feedback.description = description;
        }
        if let Some(satisfied) = update.satisfied {
            feedback.satisfied = satisfied;
        }
        feedback.updated_at = Utc::now();
        Ok(feedback.clone())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut rows: Vec<Department> = inner.departments.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn department_by_id(&self, id: Uuid) -> Result<Option<Department>, StoreError> {
        Ok(self.inner.read().unwrap().departments.get(&id).cloned())
    }

    async fn list_rotations(&self) -> Result<Vec<Rotation>, StoreError> {
        Ok(self.inner.read().unwrap().rotations.clone())
    }

    async fn list_requests(
        &self,
        kind: RequestKind,
        filter: Option<StatusFilter>,
    ) -> Result<Vec<RequestRecord>, StoreError> {
        self.request_reads.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.read().unwrap();
        Ok(inner
            .requests
            .get(&kind)
            .map(|records| {
                records
                    .iter()
                    .rev()
                    .filter(|r| match filter {
                        None => true,
                        Some(StatusFilter::Pending) => r.status == RequestStatus::Pending,
                        Some(StatusFilter::Processed) => r.status.is_terminal(),
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn request_by_id(
        &self,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<Option<RequestRecord>, StoreError> {
        self.request_reads.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.read().unwrap();
        Ok(inner
            .requests
            .get(&kind)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn insert_request(&self, request: NewRequest) -> Result<RequestRecord, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if let RequestDetail::ProjectJoin {
            apprentice_id,
            project_id,
        } = request.detail
        {
            let duplicate = inner
                .requests
                .get(&RequestKind::ProjectJoin)
                .map(|records| {
                    records.iter().any(|r| {
                        r.status == RequestStatus::Pending
                            && r.detail
                                == RequestDetail::ProjectJoin {
                                    apprentice_id,
                                    project_id,
                                }
                    })
                })
                .unwrap_or(false);
            if duplicate {
                return Err(StoreError::Conflict(
                    "A request with this status already exists for this apprentice and project"
                        .into(),
                ));
            }
        }
        let now = Utc::now();
        let record = RequestRecord {
            id: Uuid::new_v4(),
            requester_id: request.requester_id,
            status: RequestStatus::Pending,
            reason: request.reason,
            admin_notes: String::new(),
            reviewed_by_id: None,
            created_at: now,
            updated_at: now,
            detail: request.detail,
        };
        inner
            .requests
            .entry(record.kind())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update_request(&self, record: &RequestRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        let slot = inner
            .requests
            .get_mut(&record.kind())
            .and_then(|records| records.iter_mut().find(|r| r.id == record.id))
            .ok_or_else(|| {
                StoreError::NotFound(format!(
                    "{} request {} not found",
                    record.kind().tag(),
                    record.id
                ))
            })?;
        *slot = record.clone();
        Ok(())
    }

    async fn mentor_assigned(
        &self,
        mentor_user_id: Uuid,
        apprentice_id: Uuid,
        project_id: Uuid,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().unwrap();
        let mentor_on_project = inner
            .mentors
            .get(&mentor_user_id)
            .map(|m| m.project_id == Some(project_id))
            .unwrap_or(false);
        let apprentice_of_mentor = inner
            .apprentices
            .get(&apprentice_id)
            .map(|a| a.mentor_id == Some(mentor_user_id))
            .unwrap_or(false);
        Ok(mentor_on_project && apprentice_of_mentor)
    }
}
