use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::{RecordId, Role};

/// Identity of the caller, attached to request extensions by `AuthMiddleware`.
///
/// Use it as a handler argument on routes wrapped by `AuthMiddleware`. If the
/// middleware did not run, extraction fails with `AppError::MissingToken`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: RecordId,
    pub username: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = RecordId::parse(&claims.sub).ok_or_else(|| {
            AppError::InvalidToken(crate::auth::TokenError::Malformed(
                "subject is not a valid user id".into(),
            ))
        })?;
        Ok(Self {
            id,
            username: claims.username,
            role: claims.role,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => ready(Err(AppError::MissingToken.into())),
        }
    }
}
