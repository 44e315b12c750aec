use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxAccountRepo {
    pub pool: PgPool,
}
