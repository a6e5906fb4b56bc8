//! HTTP layer for the LocalLibrary catalog

pub mod admin;
pub mod catalog;
pub mod guard;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::Redirect,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{user::UserClaims, Page, PageQuery},
    AppState,
};

/// Caller identity, `None` for anonymous requests.
///
/// A missing `Authorization` header is anonymous; a malformed or invalid
/// bearer token is rejected outright.
pub struct CurrentUser(pub Option<UserClaims>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentUser(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(CurrentUser(Some(claims)))
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Rows on this page
    pub items: Vec<T>,
    /// Total number of rows
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Rows per page
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Wrap one page of rows; a page past the end is not found
    pub fn new(items: Vec<T>, total: i64, page: Page) -> AppResult<Self> {
        if !page.exists_within(total) {
            return Err(AppError::NotFound(format!("Invalid page {}", page.number)));
        }
        Ok(Self {
            items,
            total,
            page: page.number,
            per_page: page.size,
        })
    }
}

/// Resolve `?page=` against the configured page size
pub fn resolve_page(query: &PageQuery, page_size: i64) -> AppResult<Page> {
    let number = query.page.unwrap_or(1);
    let page = Page::new(number, page_size);
    if number < 1 || page.offset().is_none() {
        return Err(AppError::NotFound(format!("Invalid page {}", number)));
    }
    Ok(page)
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { Redirect::permanent("/catalog/") }))
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/catalog/", get(catalog::index))
        .route("/catalog/books/", get(catalog::list_books))
        .route("/catalog/book/:id", get(catalog::get_book))
        .route("/catalog/authors/", get(catalog::list_authors))
        .route("/catalog/author/:id", get(catalog::get_author))
        .route("/catalog/available/", get(catalog::list_available))
        // Loans
        .route("/catalog/mybooks/", get(loans::my_books))
        .route("/catalog/borrowed/", get(loans::all_borrowed))
        .route(
            "/catalog/book/:id/renew/",
            get(loans::renewal_form).post(loans::renew_book),
        )
        // Administration
        .route("/catalog/admin/authors", post(admin::create_author))
        .route(
            "/catalog/admin/authors/:id",
            put(admin::update_author).delete(admin::delete_author),
        )
        .route(
            "/catalog/admin/genres",
            get(admin::list_genres).post(admin::create_genre),
        )
        .route(
            "/catalog/admin/genres/:id",
            put(admin::update_genre).delete(admin::delete_genre),
        )
        .route(
            "/catalog/admin/languages",
            get(admin::list_languages).post(admin::create_language),
        )
        .route(
            "/catalog/admin/languages/:id",
            put(admin::update_language).delete(admin::delete_language),
        )
        .route("/catalog/admin/books", post(admin::create_book))
        .route(
            "/catalog/admin/books/:id",
            put(admin::update_book).delete(admin::delete_book),
        )
        .route("/catalog/admin/instances", post(admin::create_instance))
        .route(
            "/catalog/admin/instances/:id",
            put(admin::update_instance).delete(admin::delete_instance),
        )
        .route(
            "/catalog/admin/users/:id",
            axum::routing::delete(admin::delete_user),
        )
        .with_state(state);

    Router::new()
        .merge(app)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
