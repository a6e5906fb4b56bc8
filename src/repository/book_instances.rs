//! Book copies repository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::referential::delete_with_policy;
use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{
            BookInstance, BookInstanceInput, BookInstanceSummary, InstanceFilter, InstanceSort,
        },
        today, EntityKind, Page,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<BookInstance>;

    /// Filtered, sorted copies with the total number of matches.
    /// Without a page every match is returned.
    async fn list(
        &self,
        filter: &InstanceFilter,
        sort: InstanceSort,
        page: Option<Page>,
    ) -> AppResult<(Vec<BookInstanceSummary>, i64)>;

    /// Insert with a fresh id when `id` is `None`, replace otherwise
    async fn save(&self, id: Option<Uuid>, data: &BookInstanceInput) -> AppResult<BookInstance>;

    /// Set the due date in a single statement
    async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgBookInstanceRepository {
    pool: Pool<Postgres>,
}

impl PgBookInstanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn order_clause(sort: InstanceSort) -> &'static str {
    match sort {
        InstanceSort::DueBack => "bi.due_back ASC NULLS LAST, bi.id",
        InstanceSort::Borrower => "bi.borrower_id ASC NULLS LAST, bi.due_back ASC NULLS LAST, bi.id",
    }
}

/// WHERE clause for `filter`, placeholders numbered from `first_idx`
fn where_clause(filter: &InstanceFilter, first_idx: usize) -> String {
    let mut conditions = Vec::new();
    let mut idx = first_idx;

    if filter.status.is_some() {
        conditions.push(format!("bi.status = ${}", idx));
        idx += 1;
    }
    if filter.borrower_id.is_some() {
        conditions.push(format!("bi.borrower_id = ${}", idx));
        idx += 1;
    }
    if filter.book_id.is_some() {
        conditions.push(format!("bi.book_id = ${}", idx));
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

#[async_trait]
impl BookInstanceRepository for PgBookInstanceRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn list(
        &self,
        filter: &InstanceFilter,
        sort: InstanceSort,
        page: Option<Page>,
    ) -> AppResult<(Vec<BookInstanceSummary>, i64)> {
        macro_rules! bind_filter {
            ($builder:expr) => {{
                let mut builder = $builder;
                if let Some(status) = filter.status {
                    builder = builder.bind(status);
                }
                if let Some(borrower_id) = filter.borrower_id {
                    builder = builder.bind(borrower_id);
                }
                if let Some(book_id) = filter.book_id {
                    builder = builder.bind(book_id);
                }
                builder
            }};
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM book_instances bi {}",
            where_clause(filter, 1)
        );
        let total: i64 = bind_filter!(sqlx::query_scalar::<Postgres, i64>(&count_query))
            .fetch_one(&self.pool)
            .await?;

        // $1 is the reference date for the overdue flag; end-to-end coverage in
        // tests/integration/api_tests.rs (test_overdue_flag_in_listing)
        let mut query = format!(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint, bi.due_back,
                   bi.borrower_id, u.username AS borrower_username, bi.status,
                   COALESCE(bi.due_back < $1, FALSE) AS is_overdue
            FROM book_instances bi
            LEFT JOIN books b ON b.id = bi.book_id
            LEFT JOIN users u ON u.id = bi.borrower_id
            {}
            ORDER BY {}
            "#,
            where_clause(filter, 2),
            order_clause(sort)
        );
        if let Some(page) = page {
            let offset = page
                .offset()
                .ok_or_else(|| AppError::NotFound(format!("Invalid page {}", page.number)))?;
            query.push_str(&format!("LIMIT {} OFFSET {}", page.size, offset));
        }

        let rows = bind_filter!(sqlx::query_as::<_, BookInstanceSummary>(&query).bind(today()))
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn save(&self, id: Option<Uuid>, data: &BookInstanceInput) -> AppResult<BookInstance> {
        match id {
            None => {
                let instance = sqlx::query_as::<_, BookInstance>(
                    r#"
                    INSERT INTO book_instances (id, book_id, imprint, due_back, borrower_id, status)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(data.book_id)
                .bind(&data.imprint)
                .bind(data.due_back)
                .bind(data.borrower_id)
                .bind(data.status)
                .fetch_one(&self.pool)
                .await?;
                Ok(instance)
            }
            Some(id) => sqlx::query_as::<_, BookInstance>(
                r#"
                UPDATE book_instances
                SET book_id = $2, imprint = $3, due_back = $4, borrower_id = $5, status = $6
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(data.book_id)
            .bind(&data.imprint)
            .bind(data.due_back)
            .bind(data.borrower_id)
            .bind(data.status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id))),
        }
    }

    async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            "UPDATE book_instances SET due_back = $1 WHERE id = $2 RETURNING *",
        )
        .bind(due_back)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        delete_with_policy(&self.pool, EntityKind::BookInstance, id).await
    }
}
