//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can hit, from a malformed task id to a store timeout,
//! is one variant of it.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers and middleware
//! can return it directly; each variant renders as a JSON body with a single `error`
//! string. `From` implementations for `validator::ValidationErrors`,
//! `bcrypt::BcryptError`, `StoreError` and `TokenError` allow conversion with `?`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::store::StoreError;

/// Example value sent back with a due date format error.
pub const DUE_DATE_EXAMPLE: &str = "2023-12-31T00:00:00Z";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing input (HTTP 400).
    #[error("{0}")]
    Validation(String),

    /// A due date that is not an ISO 8601 timestamp (HTTP 400).
    #[error("Invalid date format. Use ISO 8601 format like '{}'", DUE_DATE_EXAMPLE)]
    InvalidDueDate,

    /// A path identifier that does not match the store's id format (HTTP 400).
    /// Carries the entity name, e.g. "task".
    #[error("Invalid {0} ID format")]
    InvalidId(&'static str),

    /// Registration with a username that is already taken (HTTP 400).
    #[error("username already exists")]
    DuplicateUser,

    /// A partial update that supplies nothing to change (HTTP 400).
    #[error("no valid fields provided for update")]
    NoOpUpdate,

    /// No authorization header on a protected route (HTTP 401).
    #[error("authorization header required")]
    MissingToken,

    /// Bearer token failed validation (HTTP 401).
    #[error("invalid token")]
    InvalidToken(#[source] TokenError),

    /// Unknown username or wrong password on login (HTTP 401).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but not an admin (HTTP 403).
    #[error("admin access required")]
    Forbidden,

    #[error("task not found")]
    TaskNotFound,

    /// Promotion target does not exist (HTTP 400, the id itself was the bad input).
    #[error("user not found")]
    UserNotFound,

    /// A store operation exceeded its time budget (HTTP 503).
    #[error("store operation timed out, please retry")]
    Timeout,

    /// Anything else (HTTP 500). The detail is logged, never sent to clients.
    #[error("internal server error")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<DueDateExample>,
}

#[derive(Debug, Serialize)]
pub struct DueDateExample {
    pub due_date: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::InvalidDueDate
            | AppError::InvalidId(_)
            | AppError::DuplicateUser
            | AppError::NoOpUpdate
            | AppError::UserNotFound => StatusCode::BAD_REQUEST,
            AppError::MissingToken | AppError::InvalidToken(_) | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::TaskNotFound => StatusCode::NOT_FOUND,
            AppError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            log::error!("Internal error: {}", detail);
        }

        let example = match self {
            AppError::InvalidDueDate => Some(DueDateExample {
                due_date: DUE_DATE_EXAMPLE,
            }),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            example,
        })
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// Only the custom messages are kept, so clients see e.g. "task title can not be empty".
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

/// Hashing failures are internal errors; a malformed stored hash is never the client's fault.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::DuplicateUsername => AppError::DuplicateUser,
            StoreError::Timeout(op) => {
                log::warn!("Store operation '{}' timed out", op);
                AppError::Timeout
            }
            StoreError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Encoding(msg) => AppError::Internal(format!("token encoding failed: {}", msg)),
            other => AppError::InvalidToken(other),
        }
    }
}
