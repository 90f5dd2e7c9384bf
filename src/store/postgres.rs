use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;

use super::{Result, StoreError, TaskStore, UserStore};
use crate::models::{NewUser, RecordId, Role, Task, TaskDraft, TaskPatch, User};

const UNIQUE_VIOLATION: &str = "23505";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id CHAR(24) PRIMARY KEY,
        username TEXT NOT NULL UNIQUE CHECK (username <> ''),
        password_hash TEXT NOT NULL CHECK (password_hash <> ''),
        role TEXT NOT NULL CHECK (role IN ('user', 'admin'))
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id CHAR(24) PRIMARY KEY,
        title TEXT NOT NULL CHECK (title <> ''),
        description TEXT NOT NULL CHECK (description <> ''),
        due_date TIMESTAMPTZ NOT NULL,
        status TEXT NOT NULL CHECK (status <> ''),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
];

/// PostgreSQL backed store.
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self> {
        let id = RecordId::parse(&row.id)
            .ok_or_else(|| StoreError::Backend(format!("stored user id '{}' is malformed", row.id)))?;
        let role = row.role.parse::<Role>().map_err(StoreError::Backend)?;
        Ok(User {
            id,
            username: row.username,
            password_hash: row.password_hash,
            role,
        })
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: String,
    title: String,
    description: String,
    due_date: DateTime<Utc>,
    status: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self> {
        let id = RecordId::parse(&row.id)
            .ok_or_else(|| StoreError::Backend(format!("stored task id '{}' is malformed", row.id)))?;
        Ok(Task {
            id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            status: row.status,
        })
    }
}

impl PgStore {
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        log::info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Creates the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn map_insert_error(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::DuplicateUsername
        }
        _ => StoreError::from(error),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        let id = RecordId::generate();
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent registrations so that exactly one of them can
        // observe an empty table and become admin. Plain reads are not blocked.
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, username, password_hash, role)
             VALUES ($1, $2, $3, CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'user' ELSE 'admin' END)
             RETURNING id, username, password_hash, role",
        )
        .bind(id.as_str())
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        tx.commit().await?;
        User::try_from(row)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn set_role(&self, id: &RecordId, role: Role) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, draft: TaskDraft) -> Result<Task> {
        let id = RecordId::generate();
        let row = sqlx::query_as::<_, TaskRow>(
            "INSERT INTO tasks (id, title, description, due_date, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, title, description, due_date, status",
        )
        .bind(id.as_str())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.due_date)
        .bind(&draft.status)
        .fetch_one(&self.pool)
        .await?;

        Task::try_from(row)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, description, due_date, status FROM tasks ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn find_task(&self, id: &RecordId) -> Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, description, due_date, status FROM tasks WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    async fn update_task(&self, id: &RecordId, patch: &TaskPatch) -> Result<Option<Task>> {
        // A NULL parameter keeps the stored column.
        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE tasks
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 due_date = COALESCE($4, due_date),
                 status = COALESCE($5, status)
             WHERE id = $1
             RETURNING id, title, description, due_date, status",
        )
        .bind(id.as_str())
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.due_date)
        .bind(patch.status.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    async fn delete_task(&self, id: &RecordId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
