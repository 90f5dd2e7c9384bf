use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::models::{NewTask, RecordId, Task, TaskPatch};
use crate::store::{bounded, TaskStore};

/// Task lifecycle rules on top of a [`TaskStore`].
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    store_timeout: Duration,
}

/// Rejects anything that is not a well-formed task id.
pub fn parse_task_id(raw: &str) -> Result<RecordId, AppError> {
    RecordId::parse(raw).ok_or(AppError::InvalidId("task"))
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    pub async fn create(&self, new_task: NewTask) -> Result<Task, AppError> {
        let draft = new_task.into_draft()?;
        let task = bounded(self.store_timeout, "insert_task", self.store.insert_task(draft)).await?;
        log::info!("Created task {} '{}'", task.id, task.title);
        Ok(task)
    }

    pub async fn get_all(&self) -> Result<Vec<Task>, AppError> {
        Ok(bounded(self.store_timeout, "list_tasks", self.store.list_tasks()).await?)
    }

    pub async fn get_by_id(&self, task_id: &str) -> Result<Task, AppError> {
        let id = parse_task_id(task_id)?;
        bounded(self.store_timeout, "find_task", self.store.find_task(&id))
            .await?
            .ok_or(AppError::TaskNotFound)
    }

    /// Overwrites only the fields the patch supplies. A patch with nothing in
    /// it is rejected with `NoOpUpdate` once the task is known to exist.
    pub async fn update(&self, task_id: &str, patch: TaskPatch) -> Result<Task, AppError> {
        let id = parse_task_id(task_id)?;

        if patch.is_empty() {
            let exists = bounded(self.store_timeout, "find_task", self.store.find_task(&id))
                .await?
                .is_some();
            return Err(if exists {
                AppError::NoOpUpdate
            } else {
                AppError::TaskNotFound
            });
        }

        let task = bounded(
            self.store_timeout,
            "update_task",
            self.store.update_task(&id, &patch),
        )
        .await?
        .ok_or(AppError::TaskNotFound)?;

        log::info!("Updated task {}", task.id);
        Ok(task)
    }

    pub async fn delete(&self, task_id: &str) -> Result<(), AppError> {
        let id = parse_task_id(task_id)?;
        let deleted = bounded(self.store_timeout, "delete_task", self.store.delete_task(&id)).await?;
        if !deleted {
            return Err(AppError::TaskNotFound);
        }
        log::info!("Deleted task {}", id);
        Ok(())
    }
}
