pub mod permissions;
pub mod requests;
