use actix_web::web;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenService;
use crate::routes;
use crate::services::{TaskService, UserService};
use crate::store::{TaskStore, UserStore};

/// Shared application data, built once and cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub users: web::Data<UserService>,
    pub tasks: web::Data<TaskService>,
    pub tokens: web::Data<TokenService>,
}

impl AppState {
    pub fn new(
        user_store: Arc<dyn UserStore>,
        task_store: Arc<dyn TaskStore>,
        tokens: TokenService,
        store_timeout: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        let tokens = Arc::new(tokens);
        let users = UserService::new(user_store, tokens.clone(), store_timeout, bcrypt_cost);
        let tasks = TaskService::new(task_store, store_timeout);

        Self {
            users: web::Data::new(users),
            tasks: web::Data::new(tasks),
            tokens: web::Data::from(tokens),
        }
    }

    /// Registers app data and every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.users.clone())
            .app_data(self.tasks.clone())
            .app_data(self.tokens.clone())
            .app_data(routes::json_config())
            .configure(routes::config);
    }
}
