use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organizational unit an apprentice rotates through.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled stay in a department. `duration` is in weeks.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rotation {
    pub id: Uuid,
    pub name: String,
    pub duration: i32,
    pub department_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
