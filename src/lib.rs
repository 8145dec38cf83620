pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod store;
pub mod workflow;

#[cfg(test)]
pub mod testing;
