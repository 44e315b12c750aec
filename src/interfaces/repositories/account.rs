use async_trait::async_trait;

use crate::{
    entities::account::{Account, UserType},
    errors::AppError,
    repositories::sqlx_repo::SqlxAccountRepo,
};


#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn find_by_email(&self, user_type: UserType, email: &str) -> Result<Option<Account>, AppError>;
}

impl SqlxAccountRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxAccountRepo { pool }
    }
}

#[async_trait]
impl AccountRepository for SqlxAccountRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn find_by_email(&self, user_type: UserType, email: &str) -> Result<Option<Account>, AppError> {
        // Table names come from a closed enum, never from input.
        let query = format!(
            "SELECT id, email, password_hash FROM {} WHERE email = $1",
            user_type.table()
        );

        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }
}
