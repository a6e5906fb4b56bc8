//! Staff catalog administration endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::AuthorInput, book::BookInput, book_instance::BookInstanceInput,
        genre::GenreInput, language::LanguageInput, Author, Book, BookInstance, Genre, Language,
    },
    AppState,
};

use super::{guard::RouteGuard, CurrentUser};

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/admin/authors",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(data): Json<AuthorInput>,
) -> AppResult<(StatusCode, Json<Author>)> {
    user.require_staff()?;
    let author = state.services.admin.save_author(None, data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Replace an author
#[utoipa::path(
    put,
    path = "/catalog/admin/authors/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<AuthorInput>,
) -> AppResult<Json<Author>> {
    user.require_staff()?;
    let author = state.services.admin.save_author(Some(id), data).await?;
    Ok(Json(author))
}

/// Delete an author; their books lose the author reference
#[utoipa::path(
    delete,
    path = "/catalog/admin/authors/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    user.require_staff()?;
    state.services.admin.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All genres by name
#[utoipa::path(
    get,
    path = "/catalog/admin/genres",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Genre>>> {
    user.require_staff()?;
    Ok(Json(state.services.admin.list_genres().await?))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/catalog/admin/genres",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = GenreInput,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(data): Json<GenreInput>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    user.require_staff()?;
    let genre = state.services.admin.save_genre(None, data).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// Rename a genre
#[utoipa::path(
    put,
    path = "/catalog/admin/genres/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = GenreInput,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<GenreInput>,
) -> AppResult<Json<Genre>> {
    user.require_staff()?;
    Ok(Json(state.services.admin.save_genre(Some(id), data).await?))
}

/// Delete a genre and its book associations
#[utoipa::path(
    delete,
    path = "/catalog/admin/genres/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    user.require_staff()?;
    state.services.admin.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All languages
#[utoipa::path(
    get,
    path = "/catalog/admin/languages",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Languages", body = Vec<Language>)
    )
)]
pub async fn list_languages(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Language>>> {
    user.require_staff()?;
    Ok(Json(state.services.admin.list_languages().await?))
}

/// Create a language
#[utoipa::path(
    post,
    path = "/catalog/admin/languages",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = LanguageInput,
    responses(
        (status = 201, description = "Language created", body = Language)
    )
)]
pub async fn create_language(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(data): Json<LanguageInput>,
) -> AppResult<(StatusCode, Json<Language>)> {
    user.require_staff()?;
    let language = state.services.admin.save_language(None, data).await?;
    Ok((StatusCode::CREATED, Json(language)))
}

/// Change a language
#[utoipa::path(
    put,
    path = "/catalog/admin/languages/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Language ID")),
    request_body = LanguageInput,
    responses(
        (status = 200, description = "Language updated", body = Language),
        (status = 404, description = "Language not found")
    )
)]
pub async fn update_language(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<LanguageInput>,
) -> AppResult<Json<Language>> {
    user.require_staff()?;
    Ok(Json(state.services.admin.save_language(Some(id), data).await?))
}

/// Delete a language; books keep existing without it
#[utoipa::path(
    delete,
    path = "/catalog/admin/languages/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Language ID")),
    responses(
        (status = 204, description = "Language deleted"),
        (status = 404, description = "Language not found")
    )
)]
pub async fn delete_language(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    user.require_staff()?;
    state.services.admin.delete_language(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a book with its genres
#[utoipa::path(
    post,
    path = "/catalog/admin/books",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input or unknown reference")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(data): Json<BookInput>,
) -> AppResult<(StatusCode, Json<Book>)> {
    user.require_staff()?;
    let book = state.services.admin.save_book(None, data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book and its genre set
#[utoipa::path(
    put,
    path = "/catalog/admin/books/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<BookInput>,
) -> AppResult<Json<Book>> {
    user.require_staff()?;
    Ok(Json(state.services.admin.save_book(Some(id), data).await?))
}

/// Delete a book; its copies remain with no book
#[utoipa::path(
    delete,
    path = "/catalog/admin/books/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    user.require_staff()?;
    state.services.admin.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a copy
#[utoipa::path(
    post,
    path = "/catalog/admin/instances",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = BookInstanceInput,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid input or unknown reference")
    )
)]
pub async fn create_instance(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(data): Json<BookInstanceInput>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    user.require_staff()?;
    let instance = state.services.admin.save_instance(None, data).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// Replace a copy
#[utoipa::path(
    put,
    path = "/catalog/admin/instances/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    request_body = BookInstanceInput,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_instance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(data): Json<BookInstanceInput>,
) -> AppResult<Json<BookInstance>> {
    user.require_staff()?;
    Ok(Json(state.services.admin.save_instance(Some(id), data).await?))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/catalog/admin/instances/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_instance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_staff()?;
    state.services.admin.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a local user; copies they borrowed lose their borrower
#[utoipa::path(
    delete,
    path = "/catalog/admin/users/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    user.require_staff()?;
    state.services.admin.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
