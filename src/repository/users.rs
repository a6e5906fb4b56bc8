//! Users repository.
//!
//! Accounts belong to the identity provider; the catalog keeps a projection
//! so that copies can reference their borrower.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::referential::delete_with_policy;
use crate::{
    error::{AppError, AppResult},
    models::{EntityKind, User},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<User>;

    /// Borrowed copies have their borrower cleared
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, first_name, last_name, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        delete_with_policy(&self.pool, EntityKind::User, id).await
    }
}
