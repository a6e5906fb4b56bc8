//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Literary category attached to books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Create or rename a genre
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GenreInput {
    /// e.g. "Science Fiction"
    #[validate(length(min = 1, max = 200, message = "Genre name must be 1-200 characters"))]
    pub name: String,
}

/// Comma-joined names of the first `limit` genres, in association order.
pub fn genre_summary(genres: &[Genre], limit: usize) -> String {
    genres
        .iter()
        .take(limit)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
