use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, store};

use auth::jwt::JwtService;
use repositories::{kv_repo::KvTokenRepo, sqlx_repo::SqlxAccountRepo};
use store::KeyValueStore;
use use_cases::auth::AuthHandler;

pub struct AppState {
    pub auth_handler: AppAuthHandler,
}

pub type AppAuthHandler = AuthHandler<SqlxAccountRepo, JwtService, KvTokenRepo>;

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool, store: Arc<dyn KeyValueStore>) -> Self {
        let jwt_service = JwtService::new(config);
        let account_repo = SqlxAccountRepo::new(pool);
        let token_repo = KvTokenRepo::new(store, config.token_ttls());
        let auth_handler = AuthHandler::new(account_repo, jwt_service, token_repo);

        AppState { auth_handler }
    }
}
