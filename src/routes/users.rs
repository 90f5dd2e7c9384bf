use crate::{
    auth::AuthenticatedUser, error::AppError, models::MessageResponse, services::UserService,
};
use actix_web::{put, web, HttpResponse, Responder};

/// Grants the admin role to the user with the given id.
///
/// Mounted under `/promote` behind the auth and admin gates.
#[put("/{id}")]
pub async fn promote(
    users: web::Data<UserService>,
    user_id: web::Path<String>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    users.promote_to_admin(&user_id).await?;
    log::info!("Admin '{}' promoted user {}", caller.username, user_id);
    Ok(HttpResponse::Ok().json(MessageResponse::new("user promoted to admin successfully")))
}
