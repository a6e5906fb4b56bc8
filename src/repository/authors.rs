//! Authors repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::referential::delete_with_policy;
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorInput},
        EntityKind,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Author>;

    /// All authors by last name, then first name
    async fn list(&self) -> AppResult<Vec<Author>>;

    /// Insert when `id` is `None`, replace otherwise
    async fn save(&self, id: Option<i32>, data: &AuthorInput) -> AppResult<Author>;

    /// Books referencing the author have it cleared
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgAuthorRepository {
    pool: Pool<Postgres>,
}

impl PgAuthorRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorRepository for PgAuthorRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    async fn list(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT * FROM authors ORDER BY last_name, first_name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn save(&self, id: Option<i32>, data: &AuthorInput) -> AppResult<Author> {
        let sql = match id {
            None => {
                r#"
                INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#
            }
            Some(_) => {
                r#"
                UPDATE authors
                SET first_name = $1, last_name = $2, date_of_birth = $3, date_of_death = $4
                WHERE id = $5
                RETURNING *
                "#
            }
        };

        let mut builder = sqlx::query_as::<_, Author>(sql)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(data.date_of_birth)
            .bind(data.date_of_death);

        if let Some(id) = id {
            builder = builder.bind(id);
        }

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id.unwrap_or_default())))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        delete_with_policy(&self.pool, EntityKind::Author, id).await
    }
}
