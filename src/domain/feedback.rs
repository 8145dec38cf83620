use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mentor feedback about an apprentice's work on a project.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub description: String,
    pub mentor_id: Uuid,
    pub apprentice_id: Uuid,
    pub project_id: Uuid,
    pub satisfied: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
