//! Business rules sitting between the HTTP handlers and the stores.

pub mod tasks;
pub mod users;

pub use tasks::TaskService;
pub use users::UserService;
