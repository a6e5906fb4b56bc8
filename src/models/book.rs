//! Book (catalog title) model and related types.
//!
//! A `Book` is the bibliographic record; the loanable copies are
//! [`BookInstance`](super::book_instance::BookInstance) rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    author::Author,
    book_instance::BookInstanceSummary,
    genre::Genre,
    language::Language,
};

/// Book row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
}

/// Book as shown in the paged book list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "Last First" of the author, when one is attached
    pub author_name: Option<String>,
}

/// Everything the book page shows
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub language: Option<Language>,
    /// In association order
    pub genres: Vec<Genre>,
    /// First three genre names, comma separated
    pub genre_summary: String,
    pub copies: Vec<BookInstanceSummary>,
    pub number_of_copies: i64,
}

/// Create or replace a book, including its genre set
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Summary is limited to 1000 characters"))]
    #[serde(default)]
    pub summary: String,
    /// 13 character ISBN
    #[validate(length(max = 13, message = "ISBN is limited to 13 characters"))]
    #[serde(default)]
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
    /// Stored in the given order; duplicates are ignored
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

impl BookInput {
    /// Genre ids with duplicates removed, first occurrence wins
    pub fn unique_genre_ids(&self) -> Vec<i32> {
        let mut seen = Vec::with_capacity(self.genre_ids.len());
        for id in &self.genre_ids {
            if !seen.contains(id) {
                seen.push(*id);
            }
        }
        seen
    }
}
