//! Aggregate counts over the catalog

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{EntityKind, LoanStatus},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountRepository: Send + Sync {
    /// Number of rows of an entity kind
    async fn count_all(&self, kind: EntityKind) -> AppResult<i64>;

    /// Number of copies in a given status
    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64>;

    /// Round trip to the database
    async fn ping(&self) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgCountRepository {
    pool: Pool<Postgres>,
}

impl PgCountRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CountRepository for PgCountRepository {
    async fn count_all(&self, kind: EntityKind) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", kind.table()))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
