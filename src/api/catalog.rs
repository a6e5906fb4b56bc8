//! Public catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetail},
        book::{BookDetail, BookSummary},
        book_instance::BookInstanceSummary,
        PageQuery,
    },
    AppState,
};

use super::{guard::RouteGuard, resolve_page, CurrentUser, PaginatedResponse};

/// Home page counters
#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    /// Visits of this session before the current one
    pub num_visits: i64,
}

/// Catalog home page
#[utoipa::path(
    get,
    path = "/catalog/",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog counts and session visits", body = DashboardResponse)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<DashboardResponse>)> {
    let cookie_name = state.config.session.cookie_name.clone();

    let existing = jar
        .get(&cookie_name)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
    let (session_id, jar) = match existing {
        Some(id) => (id, jar),
        None => {
            let id = Uuid::new_v4();
            let cookie = Cookie::build((cookie_name, id.to_string()))
                .path("/")
                .http_only(true);
            (id, jar.add(cookie))
        }
    };

    let counts = state.services.catalog.dashboard_counts().await?;
    let num_visits = state.services.sessions.record_visit(session_id).await?;

    Ok((
        jar,
        Json(DashboardResponse {
            num_books: counts.num_books,
            num_instances: counts.num_instances,
            num_instances_available: counts.num_instances_available,
            num_authors: counts.num_authors,
            num_visits,
        }),
    ))
}

/// Paged list of books by title
#[utoipa::path(
    get,
    path = "/catalog/books/",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "One page of books", body = PaginatedResponse<BookSummary>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookSummary>>> {
    user.require_authenticated()?;

    let page = resolve_page(&query, state.config.pagination.page_size)?;
    let (books, total) = state.services.catalog.list_books(page).await?;

    Ok(Json(PaginatedResponse::new(books, total, page)?))
}

/// Book details with genres and copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let detail = state.services.catalog.book_detail(id).await?;
    Ok(Json(detail))
}

/// All authors
#[utoipa::path(
    get,
    path = "/catalog/authors/",
    tag = "catalog",
    responses(
        (status = 200, description = "Authors by last name", body = Vec<Author>)
    )
)]
pub async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Author with their books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let detail = state.services.catalog.author_detail(id).await?;
    Ok(Json(detail))
}

/// Copies currently available for loan
#[utoipa::path(
    get,
    path = "/catalog/available/",
    tag = "catalog",
    responses(
        (status = 200, description = "Available copies", body = Vec<BookInstanceSummary>)
    )
)]
pub async fn list_available(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookInstanceSummary>>> {
    let copies = state.services.catalog.list_available_copies().await?;
    Ok(Json(copies))
}
