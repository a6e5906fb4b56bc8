//! Repository layer for database operations.
//!
//! Each entity is reached through its own capability trait so services can be
//! exercised against mocks; the PostgreSQL implementations live next to them.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod counts;
pub mod genres;
pub mod languages;
pub mod referential;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use authors::AuthorRepository;
pub use book_instances::BookInstanceRepository;
pub use books::BookRepository;
pub use counts::CountRepository;
pub use genres::GenreRepository;
pub use languages::LanguageRepository;
pub use users::UserRepository;

/// All entity repositories behind one handle
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn AuthorRepository>,
    pub genres: Arc<dyn GenreRepository>,
    pub languages: Arc<dyn LanguageRepository>,
    pub books: Arc<dyn BookRepository>,
    pub instances: Arc<dyn BookInstanceRepository>,
    pub users: Arc<dyn UserRepository>,
    pub counts: Arc<dyn CountRepository>,
}

impl Repository {
    /// Create PostgreSQL-backed repositories sharing one pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::PgAuthorRepository::new(pool.clone())),
            genres: Arc::new(genres::PgGenreRepository::new(pool.clone())),
            languages: Arc::new(languages::PgLanguageRepository::new(pool.clone())),
            books: Arc::new(books::PgBookRepository::new(pool.clone())),
            instances: Arc::new(book_instances::PgBookInstanceRepository::new(pool.clone())),
            users: Arc::new(users::PgUserRepository::new(pool.clone())),
            counts: Arc::new(counts::PgCountRepository::new(pool)),
        }
    }
}
