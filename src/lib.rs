#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "Task-management REST API with bearer-token authentication and user/admin roles."]
#![doc = "The binary (`main.rs`) builds an [`state::AppState`] from [`config::Config`] and"]
#![doc = "serves it; integration tests build the same state over the in-memory store."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
