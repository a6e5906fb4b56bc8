//! Books repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::referential::delete_with_policy;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookInput, BookSummary},
        genre::Genre,
        EntityKind, Page,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Book>;

    /// One page of books by title, with the total count
    async fn list(&self, page: Page) -> AppResult<(Vec<BookSummary>, i64)>;

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;

    /// Genres of a book in association order
    async fn genres(&self, book_id: i32) -> AppResult<Vec<Genre>>;

    /// Insert or replace a book together with its genre set
    async fn save(&self, id: Option<i32>, data: &BookInput) -> AppResult<Book>;

    /// Copies keep existing with their book cleared
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn list(&self, page: Page) -> AppResult<(Vec<BookSummary>, i64)> {
        let offset = page
            .offset()
            .ok_or_else(|| AppError::NotFound(format!("Invalid page {}", page.number)))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title, b.author_id,
                   a.last_name || ' ' || a.first_name AS author_name
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            ORDER BY b.title, b.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE author_id = $1 ORDER BY title, id",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn genres(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY bg.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    async fn save(&self, id: Option<i32>, data: &BookInput) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = match id {
            None => {
                sqlx::query_as::<_, Book>(
                    r#"
                    INSERT INTO books (title, summary, isbn, author_id, language_id)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING *
                    "#,
                )
                .bind(&data.title)
                .bind(&data.summary)
                .bind(&data.isbn)
                .bind(data.author_id)
                .bind(data.language_id)
                .fetch_one(&mut *tx)
                .await?
            }
            Some(id) => sqlx::query_as::<_, Book>(
                r#"
                UPDATE books
                SET title = $1, summary = $2, isbn = $3, author_id = $4, language_id = $5
                WHERE id = $6
                RETURNING *
                "#,
            )
            .bind(&data.title)
            .bind(&data.summary)
            .bind(&data.isbn)
            .bind(data.author_id)
            .bind(data.language_id)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?,
        };

        // The genre set is rewritten so that row order follows the input order
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book.id)
            .execute(&mut *tx)
            .await?;

        for genre_id in data.unique_genre_ids() {
            sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
                .bind(book.id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(book)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        delete_with_policy(&self.pool, EntityKind::Book, id).await
    }
}
