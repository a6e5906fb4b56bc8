//! Referential policy applied when deleting entities.
//!
//! The schema declares foreign keys without `ON DELETE` actions, so every
//! deletion runs through [`delete_with_policy`], which resolves the dependents
//! of a row according to [`RELATIONS`] inside a single transaction.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::EntityKind,
};

/// What happens to referencing rows when the referenced row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    SetNull,
    Cascade,
    Restrict,
}

/// A foreign key `table.column -> parent.id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub table: &'static str,
    pub column: &'static str,
    pub parent: EntityKind,
    pub on_delete: OnDelete,
}

/// Every foreign key of the catalog schema.
///
/// Cascade targets must be join tables: they are removed with a plain
/// `DELETE` and are never parents themselves.
// Exercised against a live database by test_deleting_author_keeps_books in
// tests/integration/api_tests.rs
pub const RELATIONS: &[Relation] = &[
    Relation {
        table: "books",
        column: "author_id",
        parent: EntityKind::Author,
        on_delete: OnDelete::SetNull,
    },
    Relation {
        table: "books",
        column: "language_id",
        parent: EntityKind::Language,
        on_delete: OnDelete::SetNull,
    },
    Relation {
        table: "book_genres",
        column: "book_id",
        parent: EntityKind::Book,
        on_delete: OnDelete::Cascade,
    },
    Relation {
        table: "book_genres",
        column: "genre_id",
        parent: EntityKind::Genre,
        on_delete: OnDelete::Cascade,
    },
    Relation {
        table: "book_instances",
        column: "book_id",
        parent: EntityKind::Book,
        on_delete: OnDelete::SetNull,
    },
    Relation {
        table: "book_instances",
        column: "borrower_id",
        parent: EntityKind::User,
        on_delete: OnDelete::SetNull,
    },
];

/// One statement of a deletion plan, bound to the deleted row's key as `$1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStep {
    /// Abort if any row still references the key
    Guard {
        table: &'static str,
        column: &'static str,
    },
    Nullify {
        table: &'static str,
        column: &'static str,
    },
    Remove {
        table: &'static str,
        column: &'static str,
    },
}

impl DeleteStep {
    pub fn sql(&self) -> String {
        match self {
            DeleteStep::Guard { table, column } => {
                format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1)", table, column)
            }
            DeleteStep::Nullify { table, column } => {
                format!("UPDATE {} SET {} = NULL WHERE {} = $1", table, column, column)
            }
            DeleteStep::Remove { table, column } => {
                format!("DELETE FROM {} WHERE {} = $1", table, column)
            }
        }
    }
}

/// Statements to run before deleting a row of `kind`, guards first
pub fn plan(kind: EntityKind, relations: &[Relation]) -> Vec<DeleteStep> {
    let dependents = relations.iter().filter(|r| r.parent == kind);

    let mut guards = Vec::new();
    let mut actions = Vec::new();
    for r in dependents {
        match r.on_delete {
            OnDelete::Restrict => guards.push(DeleteStep::Guard {
                table: r.table,
                column: r.column,
            }),
            OnDelete::SetNull => actions.push(DeleteStep::Nullify {
                table: r.table,
                column: r.column,
            }),
            OnDelete::Cascade => actions.push(DeleteStep::Remove {
                table: r.table,
                column: r.column,
            }),
        }
    }

    guards.extend(actions);
    guards
}

/// Delete one row of `kind`, resolving its dependents first.
///
/// Runs in a transaction: a `Restrict` hit or a missing row leaves the
/// database untouched.
pub async fn delete_with_policy<K>(pool: &Pool<Postgres>, kind: EntityKind, key: K) -> AppResult<()>
where
    K: for<'q> sqlx::Encode<'q, Postgres>
        + sqlx::Type<Postgres>
        + std::fmt::Display
        + Copy
        + Send
        + Sync
        + 'static,
{
    let mut tx = pool.begin().await?;

    for step in plan(kind, RELATIONS) {
        let sql = step.sql();
        match step {
            DeleteStep::Guard { table, .. } => {
                let referenced: bool = sqlx::query_scalar(&sql)
                    .bind(key)
                    .fetch_one(&mut *tx)
                    .await?;
                if referenced {
                    return Err(AppError::Conflict(format!(
                        "{} {} is still referenced by {}",
                        kind, key, table
                    )));
                }
            }
            DeleteStep::Nullify { table, column } | DeleteStep::Remove { table, column } => {
                let result = sqlx::query(&sql).bind(key).execute(&mut *tx).await?;
                if result.rows_affected() > 0 {
                    tracing::debug!(
                        "Deleting {} {}: {} row(s) of {}.{} resolved",
                        kind,
                        key,
                        result.rows_affected(),
                        table,
                        column
                    );
                }
            }
        }
    }

    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
        .bind(key)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("{} {} not found", kind, key)));
    }

    tx.commit().await?;
    tracing::info!("Deleted {} {}", kind, key);
    Ok(())
}
