pub mod account;
pub mod kv_repo;
pub mod sqlx_repo;
pub mod token;
pub mod token_service;
