pub mod feedback;
pub mod project;
pub mod request;
pub mod rotation;
pub mod task;
pub mod user;

pub use feedback::Feedback;
pub use project::{Project, ProjectStatus};
pub use request::{RequestDetail, RequestKind, RequestRecord, RequestStatus, RequestView};
pub use rotation::{Department, Rotation};
pub use task::{Task, TaskStatus};
pub use user::{ApprenticeProfile, MentorProfile, Role, TrainerProfile, User};
