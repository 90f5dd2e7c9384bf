pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{guard, web};

use crate::auth::{AdminMiddleware, AuthMiddleware};
use crate::error::AppError;

/// Route table.
///
/// Reads on `/tasks` need a valid token; every other method on `/tasks`, and
/// `/promote`, additionally need the admin role. The GET-guarded scope is
/// registered first so that non-GET requests fall through to the admin one.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(
            web::scope("/tasks")
                .guard(guard::Get())
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::get_task),
        )
        .service(
            web::scope("/tasks")
                .wrap(AdminMiddleware)
                .wrap(AuthMiddleware)
                .service(tasks::create_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(
            web::scope("/promote")
                .wrap(AdminMiddleware)
                .wrap(AuthMiddleware)
                .service(users::promote),
        );
}

/// Malformed JSON bodies become a 400 with the usual error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("invalid request body: {}", err)).into()
    })
}
