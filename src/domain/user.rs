use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Program role of a principal. Exactly one per user; the source system kept
/// four independent booleans instead, which allowed contradictory states.
/// Administrative privilege is a separate `is_staff` flag on [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Trainer,
    Mentor,
    Apprentice,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Trainer => "trainer",
            Role::Mentor => "mentor",
            Role::Apprentice => "apprentice",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trainer" => Ok(Role::Trainer),
            "mentor" => Ok(Role::Mentor),
            "apprentice" => Ok(Role::Apprentice),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated actor. One row per person; the role-specific profile
/// (trainer/mentor/apprentice) hangs off this record one-to-one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub role: Role,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Read shape returned by the API: everything except the password digest.
    pub fn to_view(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "email": self.email,
            "first_name": self.first_name,
            "last_name": self.last_name,
            "role": self.role,
            "is_staff": self.is_staff,
            "is_active": self.is_active,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// Trainer profile. Owns its user for deletion purposes: removing the
/// profile removes the principal in the same transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TrainerProfile {
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct MentorProfile {
    pub user: User,
    pub trainer_id: Uuid,
    pub is_external: bool,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprenticeProfile {
    pub user: User,
    pub trainer_id: Option<Uuid>,
    pub mentor_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}
