use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::time::Duration;
use uuid::Uuid;

use crate::config;
use crate::domain::{
    ApprenticeProfile, Department, Feedback, MentorProfile, Project, Role,
    Rotation, Task, TrainerProfile, User,
};
use crate::domain::request::{RequestDetail, RequestKind, RequestRecord, RequestStatus};

use super::{
    ApprenticeUpdate, FeedbackScope, FeedbackUpdate, MentorUpdate, NewFeedback, NewProject,
    NewRequest, NewTask, NewUser, ProjectUpdate, StatusFilter, Store, StoreError, TaskScope,
    TaskUpdate, UserUpdate,
};

/// sqlx-backed store. One pool, runtime-bound queries, row structs mapped
/// into domain types at the edge.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let db = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(Duration::from_secs(db.connection_timeout))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &NewUser,
        role: Role,
    ) -> Result<User, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, email, first_name, last_name, password_digest, role, is_staff, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8)",
        )
        .bind(id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_digest)
        .bind(role.as_str())
        .bind(user.is_staff)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(|e| conflict_on_unique(e, "A user with this email already exists"))?;

        Ok(User {
            id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password_digest: user.password_digest.clone(),
            role,
            is_staff: user.is_staff,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

fn conflict_on_unique(e: sqlx::Error, msg: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(msg.to_string())
        }
        _ => StoreError::Sqlx(e),
    }
}

fn decode_err(msg: String) -> StoreError {
    StoreError::Sqlx(sqlx::Error::Decode(msg.into()))
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    password_digest: String,
    role: String,
    is_staff: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, StoreError> {
        Ok(User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password_digest: self.password_digest,
            role: self.role.parse().map_err(decode_err)?,
            is_staff: self.is_staff,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "u.id, u.email, u.first_name, u.last_name, u.password_digest, u.role, u.is_staff, u.is_active, u.created_at, u.updated_at";

#[derive(FromRow)]
struct MentorRow {
    #[sqlx(flatten)]
    user: UserRow,
    trainer_id: Uuid,
    is_external: bool,
    project_id: Option<Uuid>,
}

impl MentorRow {
    fn into_profile(self) -> Result<MentorProfile, StoreError> {
        Ok(MentorProfile {
            user: self.user.into_user()?,
            trainer_id: self.trainer_id,
            is_external: self.is_external,
            project_id: self.project_id,
        })
    }
}

#[derive(FromRow)]
struct ApprenticeRow {
    #[sqlx(flatten)]
    user: UserRow,
    trainer_id: Option<Uuid>,
    mentor_id: Option<Uuid>,
    project_id: Option<Uuid>,
}

impl ApprenticeRow {
    fn into_profile(self) -> Result<ApprenticeProfile, StoreError> {
        Ok(ApprenticeProfile {
            user: self.user.into_user()?,
            trainer_id: self.trainer_id,
            mentor_id: self.mentor_id,
            project_id: self.project_id,
        })
    }
}

#[derive(FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: String,
    start_date: chrono::NaiveDate,
    end_date: Option<chrono::NaiveDate>,
    trainer_id: Option<Uuid>,
    is_external: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self) -> Result<Project, StoreError> {
        Ok(Project {
            id: self.id,
            name: self.name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            trainer_id: self.trainer_id,
            is_external: self.is_external,
            status: self.status.parse().map_err(decode_err)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    assigned_by: Uuid,
    assigned_to: Uuid,
    project_id: Uuid,
    due_date: chrono::NaiveDate,
    completed_at: Option<chrono::NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> Result<Task, StoreError> {
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            assigned_by: self.assigned_by,
            assigned_to: self.assigned_to,
            project_id: self.project_id,
            due_date: self.due_date,
            completed_at: self.completed_at,
            status: self.status.parse().map_err(decode_err)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// One row shape for all five request tables; columns a kind does not have
/// are selected as NULL and reconstructed into the right detail variant.
#[derive(FromRow)]
struct RequestRow {
    id: Uuid,
    requester_id: Uuid,
    status: String,
    reason: String,
    admin_notes: String,
    reviewed_by_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    apprentice_id: Option<Uuid>,
    mentor_id: Option<Uuid>,
    project_id: Option<Uuid>,
    from_department_id: Option<Uuid>,
    to_department_id: Option<Uuid>,
}

impl RequestRow {
    fn into_record(self, kind: RequestKind) -> Result<RequestRecord, StoreError> {
        let missing = |field: &str| decode_err(format!("{} row missing {}", kind.tag(), field));
        let detail = match kind {
            RequestKind::ProjectJoin => RequestDetail::ProjectJoin {
                apprentice_id: self.apprentice_id.ok_or_else(|| missing("apprentice_id"))?,
                project_id: self.project_id.ok_or_else(|| missing("project_id"))?,
            },
            RequestKind::ProjectLeave => RequestDetail::ProjectLeave {
                apprentice_id: self.apprentice_id.ok_or_else(|| missing("apprentice_id"))?,
                project_id: self.project_id.ok_or_else(|| missing("project_id"))?,
            },
            RequestKind::RotationChange => RequestDetail::RotationChange {
                apprentice_id: self.apprentice_id.ok_or_else(|| missing("apprentice_id"))?,
                from_department_id: self
                    .from_department_id
                    .ok_or_else(|| missing("from_department_id"))?,
                to_department_id: self
                    .to_department_id
                    .ok_or_else(|| missing("to_department_id"))?,
            },
            RequestKind::MentorLeave => RequestDetail::MentorLeave {
                mentor_id: self.mentor_id.ok_or_else(|| missing("mentor_id"))?,
                project_id: self.project_id.ok_or_else(|| missing("project_id"))?,
            },
            RequestKind::ApprenticeRemoval => RequestDetail::ApprenticeRemoval {
                mentor_id: self.mentor_id.ok_or_else(|| missing("mentor_id"))?,
                apprentice_id: self.apprentice_id.ok_or_else(|| missing("apprentice_id"))?,
                project_id: self.project_id.ok_or_else(|| missing("project_id"))?,
            },
        };
        Ok(RequestRecord {
            id: self.id,
            requester_id: self.requester_id,
            status: self.status.parse().map_err(decode_err)?,
            reason: self.reason,
            admin_notes: self.admin_notes,
            reviewed_by_id: self.reviewed_by_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            detail,
        })
    }
}

fn request_table(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::ProjectJoin => "project_join_requests",
        RequestKind::ProjectLeave => "project_leave_requests",
        RequestKind::RotationChange => "rotation_change_requests",
        RequestKind::MentorLeave => "mentor_leave_requests",
        RequestKind::ApprenticeRemoval => "apprentice_removal_requests",
    }
}

fn request_select(kind: RequestKind) -> String {
    let detail = match kind {
        RequestKind::ProjectJoin | RequestKind::ProjectLeave => {
            "apprentice_id, NULL::uuid AS mentor_id, project_id, \
             NULL::uuid AS from_department_id, NULL::uuid AS to_department_id"
        }
        RequestKind::RotationChange => {
            "apprentice_id, NULL::uuid AS mentor_id, NULL::uuid AS project_id, \
             from_department_id, to_department_id"
        }
        RequestKind::MentorLeave => {
            "NULL::uuid AS apprentice_id, mentor_id, project_id, \
             NULL::uuid AS from_department_id, NULL::uuid AS to_department_id"
        }
        RequestKind::ApprenticeRemoval => {
            "apprentice_id, mentor_id, project_id, \
             NULL::uuid AS from_department_id, NULL::uuid AS to_department_id"
        }
    };
    format!(
        "SELECT id, requester_id, status, reason, admin_notes, reviewed_by_id, \
         created_at, updated_at, {} FROM {}",
        detail,
        request_table(kind)
    )
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.health_check().await
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                first_name = COALESCE($3, first_name), \
                last_name = COALESCE($4, last_name), \
                password_digest = COALESCE($5, password_digest), \
                is_active = COALESCE($6, is_active), \
                updated_at = $7 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(update.email)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.password_digest)
        .bind(update.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A user with this email already exists"))?
        .ok_or_else(|| StoreError::NotFound(format!("user {} not found", id)))?;
        row.into_user()
    }

    async fn list_trainers(&self) -> Result<Vec<TrainerProfile>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users u JOIN trainers t ON t.user_id = u.id ORDER BY u.created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| Ok(TrainerProfile { user: r.into_user()? }))
            .collect()
    }

    async fn list_mentors(&self) -> Result<Vec<MentorProfile>, StoreError> {
        let rows = sqlx::query_as::<_, MentorRow>(&format!(
            "SELECT {}, m.trainer_id, m.is_external, m.project_id \
             FROM users u JOIN mentors m ON m.user_id = u.id ORDER BY u.created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MentorRow::into_profile).collect()
    }

    async fn list_apprentices(&self) -> Result<Vec<ApprenticeProfile>, StoreError> {
        let rows = sqlx::query_as::<_, ApprenticeRow>(&format!(
            "SELECT {}, a.trainer_id, a.mentor_id, a.project_id \
             FROM users u JOIN apprentices a ON a.user_id = u.id ORDER BY u.created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ApprenticeRow::into_profile).collect()
    }

    async fn trainer_by_user(&self, user_id: Uuid) -> Result<Option<TrainerProfile>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users u JOIN trainers t ON t.user_id = u.id WHERE u.id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| Ok(TrainerProfile { user: r.into_user()? }))
            .transpose()
    }

    async fn mentor_by_user(&self, user_id: Uuid) -> Result<Option<MentorProfile>, StoreError> {
        let row = sqlx::query_as::<_, MentorRow>(&format!(
            "SELECT {}, m.trainer_id, m.is_external, m.project_id \
             FROM users u JOIN mentors m ON m.user_id = u.id WHERE u.id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(MentorRow::into_profile).transpose()
    }

    async fn apprentice_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ApprenticeProfile>, StoreError> {
        let row = sqlx::query_as::<_, ApprenticeRow>(&format!(
            "SELECT {}, a.trainer_id, a.mentor_id, a.project_id \
             FROM users u JOIN apprentices a ON a.user_id = u.id WHERE u.id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ApprenticeRow::into_profile).transpose()
    }

    async fn create_trainer(&self, user: NewUser) -> Result<TrainerProfile, StoreError> {
        let mut tx = self.pool.begin().await?;
        let user = self.insert_user(&mut tx, &user, Role::Trainer).await?;
        sqlx::query("INSERT INTO trainers (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(TrainerProfile { user })
    }

    async fn create_mentor(
        &self,
        user: NewUser,
        trainer_id: Uuid,
        is_external: bool,
    ) -> Result<MentorProfile, StoreError> {
        let mut tx = self.pool.begin().await?;
        let user = self.insert_user(&mut tx, &user, Role::Mentor).await?;
        sqlx::query("INSERT INTO mentors (user_id, trainer_id, is_external) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(trainer_id)
            .bind(is_external)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(MentorProfile {
            user,
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
        let mut tx = self.pool.begin().await?;
        let user = self.insert_user(&mut tx, &user, Role::Apprentice).await?;
        sqlx::query("INSERT INTO apprentices (user_id, trainer_id, mentor_id) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(trainer_id)
            .bind(mentor_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(ApprenticeProfile {
            user,
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
        let res = sqlx::query(
            "UPDATE mentors SET \
                trainer_id = COALESCE($2, trainer_id), \
                project_id = COALESCE($3, project_id), \
                is_external = COALESCE($4, is_external) \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(update.trainer_id)
        .bind(update.project_id)
        .bind(update.is_external)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("mentor {} not found", user_id)));
        }
        self.mentor_by_user(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("mentor {} not found", user_id)))
    }

    async fn update_apprentice(
        &self,
        user_id: Uuid,
        update: ApprenticeUpdate,
    ) -> Result<ApprenticeProfile, StoreError> {
        let res = sqlx::query(
            "UPDATE apprentices SET \
                trainer_id = COALESCE($2, trainer_id), \
                mentor_id = COALESCE($3, mentor_id), \
                project_id = COALESCE($4, project_id) \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(update.trainer_id)
        .bind(update.mentor_id)
        .bind(update.project_id)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "apprentice {} not found",
                user_id
            )));
        }
        self.apprentice_by_user(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("apprentice {} not found", user_id)))
    }

    async fn delete_profile(&self, role: Role, user_id: Uuid) -> Result<(), StoreError> {
        let table = match role {
            Role::Trainer => "trainers",
            Role::Mentor => "mentors",
            Role::Apprentice => "apprentices",
        };
        // The profile owns its user: both rows go in one transaction.
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query(&format!("DELETE FROM {} WHERE user_id = $1", table))
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "{} profile {} not found",
                role, user_id
            )));
        }
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT * FROM projects ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    async fn project_by_id(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ProjectRow::into_project).transpose()
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let start_date = project.start_date.unwrap_or_else(|| now.date_naive());
        sqlx::query(
            "INSERT INTO projects (id, name, description, start_date, end_date, trainer_id, is_external, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)",
        )
        .bind(id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(start_date)
        .bind(project.end_date)
        .bind(project.trainer_id)
        .bind(project.is_external)
        .bind(project.status.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(Project {
            id,
            name: project.name,
            description: project.description,
            start_date,
            end_date: project.end_date,
            trainer_id: project.trainer_id,
            is_external: project.is_external,
            status: project.status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_project(
        &self,
        id: Uuid,
        update: ProjectUpdate,
    ) -> Result<Project, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "UPDATE projects SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                start_date = COALESCE($4, start_date), \
                end_date = COALESCE($5, end_date), \
                trainer_id = COALESCE($6, trainer_id), \
                is_external = COALESCE($7, is_external), \
                status = COALESCE($8, status), \
                updated_at = $9 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(update.trainer_id)
        .bind(update.is_external)
        .bind(update.status.map(|s| s.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("project {} not found", id)))?;
        row.into_project()
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("project {} not found", id)));
        }
        Ok(())
    }

    async fn list_tasks(&self, scope: TaskScope) -> Result<Vec<Task>, StoreError> {
        let (sql, bind) = match scope {
            TaskScope::All => ("SELECT * FROM tasks ORDER BY created_at DESC", None),
            TaskScope::AssignedBy(id) => (
                "SELECT * FROM tasks WHERE assigned_by = $1 ORDER BY created_at DESC",
                Some(id),
            ),
            TaskScope::AssignedTo(id) => (
                "SELECT * FROM tasks WHERE assigned_to = $1 ORDER BY created_at DESC",
                Some(id),
            ),
        };
        let mut query = sqlx::query_as::<_, TaskRow>(sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TaskRow::into_task).transpose()
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO tasks (id, title, description, assigned_by, assigned_to, project_id, due_date, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)",
        )
        .bind(id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assigned_by)
        .bind(task.assigned_to)
        .bind(task.project_id)
        .bind(task.due_date)
        .bind(task.status.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(Task {
            id,
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
        })
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Task, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE tasks SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                due_date = COALESCE($4, due_date), \
                completed_at = COALESCE($5, completed_at), \
                status = COALESCE($6, status), \
                updated_at = $7 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.due_date)
        .bind(update.completed_at)
        .bind(update.status.map(|s| s.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("task {} not found", id)))?;
        row.into_task()
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("task {} not found", id)));
        }
        Ok(())
    }

    async fn feedback_by_id(&self, id: Uuid) -> Result<Option<Feedback>, StoreError> {
        let row = sqlx::query_as::<_, Feedback>("SELECT * FROM feedback WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_feedback(&self, scope: FeedbackScope) -> Result<Vec<Feedback>, StoreError> {
        let (sql, id) = match scope {
            FeedbackScope::Mentor(id) => (
                "SELECT * FROM feedback WHERE mentor_id = $1 ORDER BY created_at DESC",
                id,
            ),
            FeedbackScope::Apprentice(id) => (
                "SELECT * FROM feedback WHERE apprentice_id = $1 ORDER BY created_at DESC",
                id,
            ),
            FeedbackScope::Project(id) => (
                "SELECT * FROM feedback WHERE project_id = $1 ORDER BY created_at DESC",
                id,
            ),
        };
        let rows = sqlx::query_as::<_, Feedback>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_feedback(&self, feedback: NewFeedback) -> Result<Feedback, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO feedback (id, description, mentor_id, apprentice_id, project_id, satisfied, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
        )
        .bind(id)
        .bind(&feedback.description)
        .bind(feedback.mentor_id)
        .bind(feedback.apprentice_id)
        .bind(feedback.project_id)
        .bind(feedback.satisfied)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(Feedback {
            id,
            description: feedback.description,
            mentor_id: feedback.mentor_id,
            apprentice_id: feedback.apprentice_id,
            project_id: feedback.project_id,
            satisfied: feedback.satisfied,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_feedback(
        &self,
        id: Uuid,
        update: FeedbackUpdate,
    ) -> Result<Feedback, StoreError> {
        let row = sqlx::query_as::<_, Feedback>(
            "UPDATE feedback SET \
                description = COALESCE($2, description), \
                satisfied = COALESCE($3, satisfied), \
                updated_at = $4 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(update.description)
        .bind(update.satisfied)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("feedback {} not found", id)))?;
        Ok(row)
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let rows = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn department_by_id(&self, id: Uuid) -> Result<Option<Department>, StoreError> {
        let row = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_rotations(&self) -> Result<Vec<Rotation>, StoreError> {
        let rows = sqlx::query_as::<_, Rotation>(
            "SELECT * FROM rotations ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_requests(
        &self,
        kind: RequestKind,
        filter: Option<StatusFilter>,
    ) -> Result<Vec<RequestRecord>, StoreError> {
        let clause = match filter {
            None => "",
            Some(StatusFilter::Pending) => " WHERE status = 'pending'",
            Some(StatusFilter::Processed) => " WHERE status IN ('approved', 'rejected')",
        };
        let sql = format!("{}{} ORDER BY created_at DESC", request_select(kind), clause);
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(|r| r.into_record(kind)).collect()
    }

    async fn request_by_id(
        &self,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<Option<RequestRecord>, StoreError> {
        let sql = format!("{} WHERE id = $1", request_select(kind));
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.into_record(kind)).transpose()
    }

    async fn insert_request(&self, request: NewRequest) -> Result<RequestRecord, StoreError> {
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
        let kind = record.kind();
        let common_tail = "reason, status, admin_notes, created_at, updated_at";
        let result = match record.detail {
            RequestDetail::ProjectJoin {
                apprentice_id,
                project_id,
            }
            | RequestDetail::ProjectLeave {
                apprentice_id,
                project_id,
            } => {
                sqlx::query(&format!(
                    "INSERT INTO {} (id, requester_id, apprentice_id, project_id, {}) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)",
                    request_table(kind),
                    common_tail
                ))
                .bind(record.id)
                .bind(record.requester_id)
                .bind(apprentice_id)
                .bind(project_id)
                .bind(&record.reason)
                .bind(record.status.as_str())
                .bind(&record.admin_notes)
                .bind(record.created_at)
                .execute(&self.pool)
                .await
            }
            RequestDetail::RotationChange {
                apprentice_id,
                from_department_id,
                to_department_id,
            } => {
                sqlx::query(&format!(
                    "INSERT INTO {} (id, requester_id, apprentice_id, from_department_id, to_department_id, {}) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)",
                    request_table(kind),
                    common_tail
                ))
                .bind(record.id)
                .bind(record.requester_id)
                .bind(apprentice_id)
                .bind(from_department_id)
                .bind(to_department_id)
                .bind(&record.reason)
                .bind(record.status.as_str())
                .bind(&record.admin_notes)
                .bind(record.created_at)
                .execute(&self.pool)
                .await
            }
            RequestDetail::MentorLeave {
                mentor_id,
                project_id,
            } => {
                sqlx::query(&format!(
                    "INSERT INTO {} (id, requester_id, mentor_id, project_id, {}) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)",
                    request_table(kind),
                    common_tail
                ))
                .bind(record.id)
                .bind(record.requester_id)
                .bind(mentor_id)
                .bind(project_id)
                .bind(&record.reason)
                .bind(record.status.as_str())
                .bind(&record.admin_notes)
                .bind(record.created_at)
                .execute(&self.pool)
                .await
            }
            RequestDetail::ApprenticeRemoval {
                mentor_id,
                apprentice_id,
                project_id,
            } => {
                sqlx::query(&format!(
                    "INSERT INTO {} (id, requester_id, mentor_id, apprentice_id, project_id, {}) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)",
                    request_table(kind),
                    common_tail
                ))
                .bind(record.id)
                .bind(record.requester_id)
                .bind(mentor_id)
                .bind(apprentice_id)
                .bind(project_id)
                .bind(&record.reason)
                .bind(record.status.as_str())
                .bind(&record.admin_notes)
                .bind(record.created_at)
                .execute(&self.pool)
                .await
            }
        };
        result.map_err(|e| {
            conflict_on_unique(
                e,
                "A request with this status already exists for this apprentice and project",
            )
        })?;
        Ok(record)
    }

    async fn update_request(&self, record: &RequestRecord) -> Result<(), StoreError> {
        let res = sqlx::query(&format!(
            "UPDATE {} SET status = $2, admin_notes = $3, reviewed_by_id = $4, updated_at = $5 \
             WHERE id = $1",
            request_table(record.kind())
        ))
        .bind(record.id)
        .bind(record.status.as_str())
        .bind(&record.admin_notes)
        .bind(record.reviewed_by_id)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "{} request {} not found",
                record.kind().tag(),
                record.id
            )));
        }
        Ok(())
    }

    async fn mentor_assigned(
        &self,
        mentor_user_id: Uuid,
        apprentice_id: Uuid,
        project_id: Uuid,
    ) -> Result<bool, StoreError> {
        let assigned: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
                SELECT 1 FROM mentors m \
                JOIN apprentices a ON a.mentor_id = m.user_id \
                WHERE m.user_id = $1 AND a.user_id = $2 AND m.project_id = $3)",
        )
        .bind(mentor_user_id)
        .bind(apprentice_id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(assigned)
    }
}
