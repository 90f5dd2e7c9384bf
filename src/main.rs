use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use std::io;
use std::sync::Arc;

use taskgate::auth::TokenService;
use taskgate::config::Config;
use taskgate::state::AppState;
use taskgate::store::{MemoryStore, PgStore, TaskStore, UserStore};

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

fn shared<S>(store: S) -> (Arc<dyn UserStore>, Arc<dyn TaskStore>)
where
    S: UserStore + TaskStore + 'static,
{
    let store = Arc::new(store);
    let users: Arc<dyn UserStore> = store.clone();
    let tasks: Arc<dyn TaskStore> = store;
    (users, tasks)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;

    let (user_store, task_store) = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.store_timeout)
                .await
                .map_err(startup_error)?;
            store.migrate().await.map_err(startup_error)?;
            shared(store)
        }
        None => {
            log::warn!("DATABASE_URL is not set, data is kept in memory and lost on exit");
            shared(MemoryStore::new())
        }
    };

    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl());
    log::info!("Tokens expire after {} hours", tokens.ttl().num_hours());

    let state = AppState::new(
        user_store,
        task_store,
        tokens,
        config.store_timeout,
        config.bcrypt_cost,
    );

    log::info!("Starting taskgate server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
