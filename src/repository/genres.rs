//! Genres repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::referential::delete_with_policy;
use crate::{
    error::{AppError, AppResult},
    models::{
        genre::{Genre, GenreInput},
        EntityKind,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Genre>;

    /// All genres by name
    async fn list(&self) -> AppResult<Vec<Genre>>;

    async fn save(&self, id: Option<i32>, data: &GenreInput) -> AppResult<Genre>;

    /// Book associations are removed, books stay
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgGenreRepository {
    pool: Pool<Postgres>,
}

impl PgGenreRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreRepository for PgGenreRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }

    async fn list(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn save(&self, id: Option<i32>, data: &GenreInput) -> AppResult<Genre> {
        match id {
            None => {
                let genre = sqlx::query_as::<_, Genre>(
                    "INSERT INTO genres (name) VALUES ($1) RETURNING id, name",
                )
                .bind(&data.name)
                .fetch_one(&self.pool)
                .await?;
                Ok(genre)
            }
            Some(id) => sqlx::query_as::<_, Genre>(
                "UPDATE genres SET name = $1 WHERE id = $2 RETURNING id, name",
            )
            .bind(&data.name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id))),
        }
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        delete_with_policy(&self.pool, EntityKind::Genre, id).await
    }
}
