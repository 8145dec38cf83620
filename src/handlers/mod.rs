//! One module per API area. Handlers stay thin: extract, gate, delegate to
//! the workflow layer or the store, wrap in the response envelope.

pub mod auth;
pub mod feedback;
pub mod projects;
pub mod requests;
pub mod rotations;
pub mod tasks;
pub mod users;
