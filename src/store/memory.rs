use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Result, StoreError, TaskStore, UserStore};
use crate::models::{NewUser, RecordId, Role, Task, TaskDraft, TaskPatch, User};

/// In-process store for tests and local runs without a database.
///
/// Each collection sits behind one lock, so every trait method observes and
/// mutates its collection atomically.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<RecordId, User>>,
    // Insertion order is the listing order.
    tasks: RwLock<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        let mut users = write(&self.users)?;

        if users.values().any(|u| u.username == new_user.username) {
            return Err(StoreError::DuplicateUsername);
        }

        let role = if users.is_empty() { Role::Admin } else { Role::User };
        let user = User {
            id: RecordId::generate(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            role,
        };
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = read(&self.users)?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn set_role(&self, id: &RecordId, role: Role) -> Result<bool> {
        let mut users = write(&self.users)?;
        match users.get_mut(id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, draft: TaskDraft) -> Result<Task> {
        let task = draft.into_task(RecordId::generate());
        write(&self.tasks)?.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(read(&self.tasks)?.clone())
    }

    async fn find_task(&self, id: &RecordId) -> Result<Option<Task>> {
        Ok(read(&self.tasks)?.iter().find(|t| &t.id == id).cloned())
    }

    async fn update_task(&self, id: &RecordId, patch: &TaskPatch) -> Result<Option<Task>> {
        let mut tasks = write(&self.tasks)?;
        Ok(tasks.iter_mut().find(|t| &t.id == id).map(|task| {
            patch.apply_to(task);
            task.clone()
        }))
    }

    async fn delete_task(&self, id: &RecordId) -> Result<bool> {
        let mut tasks = write(&self.tasks)?;
        let before = tasks.len();
        tasks.retain(|t| &t.id != id);
        Ok(tasks.len() != before)
    }
}
