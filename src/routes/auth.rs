use crate::{
    auth::{LoginRequest, RegisterRequest},
    error::AppError,
    models::MessageResponse,
    services::UserService,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// The first account ever registered becomes an admin.
#[post("/register")]
pub async fn register(
    users: web::Data<UserService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    users.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(MessageResponse::new("user created successfully")))
}

/// Login user
///
/// Returns a bearer token and the public view of the user.
#[post("/login")]
pub async fn login(
    users: web::Data<UserService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = users.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
