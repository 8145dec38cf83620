use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of approvable request kinds. Each kind is addressed by a
/// short URL tag; adding a kind means adding a variant here plus its
/// [`RequestDetail`] payload, and nothing else may special-case kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    ProjectJoin,
    ProjectLeave,
    RotationChange,
    MentorLeave,
    ApprenticeRemoval,
}

impl RequestKind {
    pub const ALL: [RequestKind; 5] = [
        RequestKind::ProjectJoin,
        RequestKind::ProjectLeave,
        RequestKind::RotationChange,
        RequestKind::MentorLeave,
        RequestKind::ApprenticeRemoval,
    ];

    /// URL tag, as exposed on the approve endpoint.
    pub fn tag(&self) -> &'static str {
        match self {
            RequestKind::ProjectJoin => "join",
            RequestKind::ProjectLeave => "leave",
            RequestKind::RotationChange => "rotation",
            RequestKind::MentorLeave => "mentor_leave",
            RequestKind::ApprenticeRemoval => "remove_apprentice",
        }
    }

    pub fn from_tag(tag: &str) -> Option<RequestKind> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Approved or rejected. Terminal states are display-only: no further
    /// domain action is triggered by reaching one.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status: {}", other)),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific subject references. Profile references use the profile
/// owner's user id (profiles are keyed by their user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestDetail {
    ProjectJoin {
        apprentice_id: Uuid,
        project_id: Uuid,
    },
    ProjectLeave {
        apprentice_id: Uuid,
        project_id: Uuid,
    },
    RotationChange {
        apprentice_id: Uuid,
        from_department_id: Uuid,
        to_department_id: Uuid,
    },
    MentorLeave {
        mentor_id: Uuid,
        project_id: Uuid,
    },
    ApprenticeRemoval {
        mentor_id: Uuid,
        apprentice_id: Uuid,
        project_id: Uuid,
    },
}

impl RequestDetail {
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestDetail::ProjectJoin { .. } => RequestKind::ProjectJoin,
            RequestDetail::ProjectLeave { .. } => RequestKind::ProjectLeave,
            RequestDetail::RotationChange { .. } => RequestKind::RotationChange,
            RequestDetail::MentorLeave { .. } => RequestKind::MentorLeave,
            RequestDetail::ApprenticeRemoval { .. } => RequestKind::ApprenticeRemoval,
        }
    }
}

/// One approvable request. Created as `pending` by its requester, reviewed
/// exactly once in the common path by a trainer/admin. Never deleted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub status: RequestStatus,
    pub reason: String,
    pub admin_notes: String,
    pub reviewed_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub detail: RequestDetail,
}

impl RequestRecord {
    pub fn kind(&self) -> RequestKind {
        self.detail.kind()
    }

    pub fn to_view(&self) -> RequestView {
        let mut view = RequestView {
            id: self.id,
            kind: self.kind().tag(),
            requester: self.requester_id,
            status: self.status,
            reason: self.reason.clone(),
            admin_notes: self.admin_notes.clone(),
            reviewed_by: self.reviewed_by_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            apprentice: None,
            mentor: None,
            project: None,
            from_department: None,
            to_department: None,
        };
        match self.detail {
            RequestDetail::ProjectJoin {
                apprentice_id,
                project_id,
            }
            | RequestDetail::ProjectLeave {
                apprentice_id,
                project_id,
            } => {
                view.apprentice = Some(apprentice_id);
                view.project = Some(project_id);
            }
            RequestDetail::RotationChange {
                apprentice_id,
                from_department_id,
                to_department_id,
            } => {
                view.apprentice = Some(apprentice_id);
                view.from_department = Some(from_department_id);
                view.to_department = Some(to_department_id);
            }
            RequestDetail::MentorLeave {
                mentor_id,
                project_id,
            } => {
                view.mentor = Some(mentor_id);
                view.project = Some(project_id);
            }
            RequestDetail::ApprenticeRemoval {
                mentor_id,
                apprentice_id,
                project_id,
            } => {
                view.mentor = Some(mentor_id);
                view.apprentice = Some(apprentice_id);
                view.project = Some(project_id);
            }
        }
        view
    }
}

/// Approved read shape for a request, shared by all five kinds. Subject
/// references absent for a kind are omitted from the JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub id: Uuid,
    pub kind: &'static str,
    pub requester: Uuid,
    pub status: RequestStatus,
    pub reason: String,
    pub admin_notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apprentice: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_department: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_department: Option<Uuid>,
}
