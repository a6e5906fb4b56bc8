//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod enums;
pub mod genre;
pub mod language;
pub mod loan;
pub mod user;

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use book_instance::BookInstance;
pub use enums::{LanguageName, LoanStatus};
pub use genre::Genre;
pub use language::Language;
pub use user::{Permission, User, UserClaims};

/// Current local date, the reference for due dates
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Persisted entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Author,
    Genre,
    Language,
    Book,
    BookInstance,
    User,
}

impl EntityKind {
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Author => "authors",
            EntityKind::Genre => "genres",
            EntityKind::Language => "languages",
            EntityKind::Book => "books",
            EntityKind::BookInstance => "book_instances",
            EntityKind::User => "users",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::Author => "Author",
            EntityKind::Genre => "Genre",
            EntityKind::Language => "Language",
            EntityKind::Book => "Book",
            EntityKind::BookInstance => "Book instance",
            EntityKind::User => "User",
        };
        write!(f, "{}", label)
    }
}

/// Page selection query (`?page=2`)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
}

/// A resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub fn new(number: i64, size: i64) -> Self {
        Self { number, size }
    }

    /// Rows skipped before this page, `None` when it does not fit in an `i64`
    pub fn offset(&self) -> Option<i64> {
        self.number.checked_sub(1)?.checked_mul(self.size)
    }

    /// Page 1 always exists; later pages must start within `total`
    pub fn exists_within(&self, total: i64) -> bool {
        self.number == 1
            || (self.number > 1 && self.offset().map_or(false, |offset| offset < total))
    }
}
