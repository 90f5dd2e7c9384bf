use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{MessageResponse, TaskPayload, TaskUpdatedResponse},
    services::{tasks::parse_task_id, TaskService},
};
use actix_web::{delete, get, post, put, web, Error, HttpResponse, Responder};

/// Lists every task.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks, empty when there are none.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[get("")]
pub async fn get_tasks(tasks: web::Data<TaskService>) -> Result<impl Responder, AppError> {
    let all = tasks.get_all().await?;
    Ok(HttpResponse::Ok().json(all))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `400 Bad Request`: the id is not 24 hex characters.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `404 Not Found`: no task with this id.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get_by_id(&task_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Creates a new task. Admin only.
///
/// ## Request Body:
/// `title`, `description`, `due_date` (RFC 3339 string) and `status`, all required.
///
/// ## Responses:
/// - `201 Created`: the stored task with its assigned id.
/// - `400 Bad Request`: a missing field or an unparsable due date.
/// - `401 Unauthorized` / `403 Forbidden`: not an authenticated admin.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskPayload>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let new_task = task_data.into_inner().into_new_task()?;
    let task = tasks.create(new_task).await?;
    log::debug!("Task {} created by '{}'", task.id, caller.username);
    Ok(HttpResponse::Created().json(task))
}

/// Updates the supplied, non-empty fields of a task. Admin only.
///
/// The id is checked before the body, so a malformed id is reported as such
/// whatever the body contains.
///
/// ## Responses:
/// - `200 OK`: `{"message": ..., "updated task": {...}}`.
/// - `400 Bad Request`: bad id, bad due date, or nothing to update.
/// - `401 Unauthorized` / `403 Forbidden`: not an authenticated admin.
/// - `404 Not Found`: no task with this id.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
    task_data: Result<web::Json<TaskPayload>, Error>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, Error> {
    parse_task_id(&task_id)?;
    let patch = task_data?.into_inner().into_patch()?;
    let task = tasks.update(&task_id, patch).await?;
    log::debug!("Task {} updated by '{}'", task.id, caller.username);
    Ok(HttpResponse::Ok().json(TaskUpdatedResponse {
        message: "task updated successfully".into(),
        task,
    }))
}

/// Deletes a task by its ID. Admin only.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    tasks.delete(&task_id).await?;
    log::debug!("Task {} deleted by '{}'", task_id, caller.username);
    Ok(HttpResponse::Ok().json(MessageResponse::new("task deleted successfully")))
}
