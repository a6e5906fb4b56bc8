//! Languages repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::referential::delete_with_policy;
use crate::{
    error::{AppError, AppResult},
    models::{
        language::{Language, LanguageInput},
        EntityKind,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Language>;

    async fn list(&self) -> AppResult<Vec<Language>>;

    async fn save(&self, id: Option<i32>, data: &LanguageInput) -> AppResult<Language>;

    /// Books written in the language have it cleared
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgLanguageRepository {
    pool: Pool<Postgres>,
}

impl PgLanguageRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LanguageRepository for PgLanguageRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Language> {
        sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language with id {} not found", id)))
    }

    async fn list(&self) -> AppResult<Vec<Language>> {
        let languages =
            sqlx::query_as::<_, Language>("SELECT id, name FROM languages ORDER BY name, id")
                .fetch_all(&self.pool)
                .await?;
        Ok(languages)
    }

    async fn save(&self, id: Option<i32>, data: &LanguageInput) -> AppResult<Language> {
        match id {
            None => {
                let language = sqlx::query_as::<_, Language>(
                    "INSERT INTO languages (name) VALUES ($1) RETURNING id, name",
                )
                .bind(data.name)
                .fetch_one(&self.pool)
                .await?;
                Ok(language)
            }
            Some(id) => sqlx::query_as::<_, Language>(
                "UPDATE languages SET name = $1 WHERE id = $2 RETURNING id, name",
            )
            .bind(data.name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language with id {} not found", id))),
        }
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        delete_with_policy(&self.pool, EntityKind::Language, id).await
    }
}
