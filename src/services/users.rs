use actix_web::web;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::auth::{
    hash_password, verify_password, LoginRequest, LoginResponse, RegisterRequest, TokenService,
};
use crate::error::AppError;
use crate::models::{NewUser, PublicUser, RecordId, Role};
use crate::store::{bounded, UserStore};

/// Registration, login and promotion rules on top of a [`UserStore`].
pub struct UserService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    store_timeout: Duration,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        store_timeout: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            store,
            tokens,
            store_timeout,
            bcrypt_cost,
        }
    }

    /// Creates an account. The very first account becomes `admin`, every
    /// later one `user`; the store decides this atomically with the insert.
    pub async fn register(&self, request: RegisterRequest) -> Result<PublicUser, AppError> {
        if request.username.is_empty() {
            return Err(AppError::Validation("username can not be empty".into()));
        }
        if request.password.is_empty() {
            return Err(AppError::Validation("password can not be empty".into()));
        }
        request.validate()?;

        // The store rejects duplicates on insert as well.
        let existing = bounded(
            self.store_timeout,
            "find_user_by_username",
            self.store.find_user_by_username(&request.username),
        )
        .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateUser);
        }

        let cost = self.bcrypt_cost;
        let password = request.password;
        let password_hash = web::block(move || hash_password(&password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

        let user = bounded(
            self.store_timeout,
            "insert_user",
            self.store.insert_user(NewUser {
                username: request.username,
                password_hash,
            }),
        )
        .await?;

        log::info!("Registered user '{}' ({}) as {}", user.username, user.id, user.role);
        Ok(PublicUser::from(&user))
    }

    /// Checks credentials and issues a token.
    ///
    /// An unknown username and a wrong password produce the same
    /// `InvalidCredentials` error.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        request.validate()?;

        let user = bounded(
            self.store_timeout,
            "find_user_by_username",
            self.store.find_user_by_username(&request.username),
        )
        .await?;

        let Some(user) = user else {
            log::warn!("Login rejected: unknown username '{}'", request.username);
            return Err(AppError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let password = request.password;
        let matches = web::block(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))??;

        if !matches {
            log::warn!("Login rejected: wrong password for '{}'", user.username);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.id, &user.username, user.role)?;
        log::info!("User '{}' logged in", user.username);

        Ok(LoginResponse {
            token,
            user: PublicUser::from(&user),
        })
    }

    /// Grants the admin role. Promoting an existing admin is a no-op success.
    pub async fn promote_to_admin(&self, user_id: &str) -> Result<(), AppError> {
        let id = RecordId::parse(user_id).ok_or(AppError::InvalidId("user"))?;

        let matched = bounded(
            self.store_timeout,
            "set_role",
            self.store.set_role(&id, Role::Admin),
        )
        .await?;

        if !matched {
            return Err(AppError::UserNotFound);
        }

        log::info!("Promoted user {} to admin", id);
        Ok(())
    }
}
