//! Persistence layer abstraction.
//!
//! Services talk to the [`UserStore`] and [`TaskStore`] traits only. Two
//! implementations exist: [`MemoryStore`] for tests and local runs, and
//! [`PgStore`] backed by PostgreSQL.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::models::{NewUser, RecordId, Role, Task, TaskDraft, TaskPatch, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Default time budget for a single store operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already exists")]
    DuplicateUsername,

    /// The named operation did not finish within its time budget.
    #[error("store operation '{0}' timed out")]
    Timeout(&'static str),

    #[error("store error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Backend(error.to_string())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user. The role is `admin` when no user exists yet and
    /// `user` otherwise; the emptiness check and the insert happen atomically.
    async fn insert_user(&self, user: NewUser) -> Result<User>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Sets the role of a user. Returns `false` when no user has this id.
    async fn set_role(&self, id: &RecordId, role: Role) -> Result<bool>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a task under a freshly assigned id.
    async fn insert_task(&self, draft: TaskDraft) -> Result<Task>;

    async fn list_tasks(&self) -> Result<Vec<Task>>;

    async fn find_task(&self, id: &RecordId) -> Result<Option<Task>>;

    /// Applies the supplied fields of `patch` in one atomic operation and
    /// returns the updated record, or `None` when no task has this id.
    async fn update_task(&self, id: &RecordId, patch: &TaskPatch) -> Result<Option<Task>>;

    /// Returns `false` when no task has this id.
    async fn delete_task(&self, id: &RecordId) -> Result<bool>;
}

/// Runs a store operation under a time budget.
pub async fn bounded<T, F>(budget: Duration, op: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(op)),
    }
}
