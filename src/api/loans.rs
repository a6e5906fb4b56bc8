//! Loan listing and renewal endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::BookInstanceSummary,
        loan::{RenewalForm, RenewalOutcome, RenewalSubmission},
        PageQuery, Permission,
    },
    AppState,
};

use super::{guard::RouteGuard, resolve_page, CurrentUser, PaginatedResponse};

/// Where a successful renewal sends the librarian
pub const AFTER_RENEWAL: &str = "/catalog/borrowed/";

/// Copies on loan to the caller, soonest due first
#[utoipa::path(
    get,
    path = "/catalog/mybooks/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's borrowed copies", body = PaginatedResponse<BookInstanceSummary>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn my_books(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceSummary>>> {
    let claims = user.require_authenticated()?;

    let page = resolve_page(&query, state.config.pagination.page_size)?;
    let (copies, total) = state
        .services
        .catalog
        .list_for_user(claims.user_id, page)
        .await?;

    Ok(Json(PaginatedResponse::new(copies, total, page)?))
}

/// Every copy on loan, ordered by borrower
#[utoipa::path(
    get,
    path = "/catalog/borrowed/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All borrowed copies", body = PaginatedResponse<BookInstanceSummary>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn all_borrowed(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceSummary>>> {
    user.require_permission(Permission::CanMarkReturned)?;

    let page = resolve_page(&query, state.config.pagination.page_size)?;
    let (copies, total) = state.services.catalog.list_all_borrowed(page).await?;

    Ok(Json(PaginatedResponse::new(copies, total, page)?))
}

/// Renewal form with the proposed date
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Fresh renewal form", body = RenewalForm),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalForm>> {
    user.require_permission(Permission::CanMarkReturned)?;

    let form = state.services.loans.renewal_form(id).await?;
    Ok(Json(form))
}

/// Submit a new due date
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewalSubmission,
    responses(
        (status = 303, description = "Renewed, redirect to all borrowed copies"),
        (status = 400, description = "Body is not a renewal form"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Date rejected, form returned with errors", body = RenewalForm)
    )
)]
pub async fn renew_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<RenewalSubmission>, JsonRejection>,
) -> AppResult<Response> {
    user.require_permission(Permission::CanMarkReturned)?;
    let Json(submission) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let response = match state.services.loans.renew(id, &submission).await? {
        RenewalOutcome::Applied(_) => Redirect::to(AFTER_RENEWAL).into_response(),
        RenewalOutcome::Rejected(form) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(form)).into_response()
        }
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{app, json_body, send, token};
    use super::AFTER_RENEWAL;
    use crate::{
        error::AppError,
        models::{loan::RenewalPolicy, today, BookInstance, LoanStatus},
        repository::testing::MockRepository,
        services::sessions::MockSessionStore,
    };
    use axum::{
        body::Body,
        http::{
            header::{AUTHORIZATION, CONTENT_TYPE, LOCATION},
            Method, Request, StatusCode,
        },
    };
    use chrono::Duration;
    use uuid::Uuid;

    const LIBRARIAN: &[&str] = &["catalog.can_mark_returned"];

    fn on_loan(id: Uuid) -> BookInstance {
        BookInstance {
            id,
            book_id: Some(1),
            imprint: "Tor, 2005".to_string(),
            due_back: Some(today()),
            borrower_id: Some(2),
            status: LoanStatus::OnLoan,
        }
    }

    fn renew_request(id: Uuid, auth: Option<String>, date: &str) -> Request<Body> {
        renew_request_with_body(id, auth, format!(r#"{{"renewal_date": "{}"}}"#, date))
    }

    fn renew_request_with_body(id: Uuid, auth: Option<String>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(format!("/catalog/book/{}/renew/", id))
            .header(CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_renewal_is_unauthorized() {
        let mut repo = MockRepository::default();
        repo.instances.expect_update_due_back().never();

        let response = send(
            app(repo, MockSessionStore::new()),
            renew_request(Uuid::new_v4(), None, "2030-01-01"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_renewal_with_bad_body_is_unauthorized() {
        let mut repo = MockRepository::default();
        repo.instances.expect_find_by_id().never();

        let response = send(
            app(repo, MockSessionStore::new()),
            renew_request_with_body(Uuid::new_v4(), None, "not json".to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_renewal_without_date_returns_form_with_error() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Ok(on_loan(id)));
        repo.instances.expect_update_due_back().never();

        let response = send(
            app(repo, MockSessionStore::new()),
            renew_request_with_body(Uuid::new_v4(), Some(token(9, LIBRARIAN, false)), "{}".to_string()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["errors"][0], "Invalid date format, expected YYYY-MM-DD");
    }

    #[tokio::test]
    async fn test_renewal_with_mistyped_date_is_bad_request() {
        let mut repo = MockRepository::default();
        repo.instances.expect_find_by_id().never();
        repo.instances.expect_update_due_back().never();

        let response = send(
            app(repo, MockSessionStore::new()),
            renew_request_with_body(
                Uuid::new_v4(),
                Some(token(9, LIBRARIAN, false)),
                r#"{"renewal_date": 5}"#.to_string(),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "BadValue");
    }

    #[tokio::test]
    async fn test_renewal_without_permission_is_forbidden() {
        let mut repo = MockRepository::default();
        repo.instances.expect_find_by_id().never();

        let response = send(
            app(repo, MockSessionStore::new()),
            renew_request(Uuid::new_v4(), Some(token(2, &[], false)), "2030-01-01"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_valid_renewal_redirects_to_borrowed_list() {
        let new_date = today() + Duration::weeks(2);
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Ok(on_loan(id)));
        repo.instances
            .expect_update_due_back()
            .times(1)
            .returning(|id, date| {
                Ok(BookInstance {
                    due_back: Some(date),
                    ..on_loan(id)
                })
            });

        let response = send(
            app(repo, MockSessionStore::new()),
            renew_request(
                Uuid::new_v4(),
                Some(token(9, LIBRARIAN, false)),
                &new_date.format("%Y-%m-%d").to_string(),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], AFTER_RENEWAL);
    }

    #[tokio::test]
    async fn test_past_renewal_returns_form_with_error() {
        let yesterday = today() - Duration::days(1);
        let raw = yesterday.format("%Y-%m-%d").to_string();
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Ok(on_loan(id)));
        repo.instances.expect_update_due_back().never();

        let response = send(
            app(repo, MockSessionStore::new()),
            renew_request(Uuid::new_v4(), Some(token(9, LIBRARIAN, false)), &raw),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["renewal_date"], raw.as_str());
        assert_eq!(body["errors"][0], "Invalid date - renewal in past");
    }

    #[tokio::test]
    async fn test_renewal_form_proposes_three_weeks() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Ok(on_loan(id)));

        let response = send(
            app(repo, MockSessionStore::new()),
            Request::builder()
                .uri(format!("/catalog/book/{}/renew/", Uuid::new_v4()))
                .header(AUTHORIZATION, token(9, LIBRARIAN, false))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let expected = RenewalPolicy::default().proposed_date(today());
        assert_eq!(
            json_body(response).await["renewal_date"],
            expected.format("%Y-%m-%d").to_string()
        );
    }

    #[tokio::test]
    async fn test_renewal_of_unknown_copy_is_not_found() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Book instance {} not found", id))));

        let response = send(
            app(repo, MockSessionStore::new()),
            Request::builder()
                .uri(format!("/catalog/book/{}/renew/", Uuid::new_v4()))
                .header(AUTHORIZATION, token(9, LIBRARIAN, false))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_my_books_uses_caller_id() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_list()
            .withf(|filter, _, _| filter.borrower_id == Some(12))
            .times(1)
            .returning(|_, _, _| Ok((Vec::new(), 0)));

        let response = send(
            app(repo, MockSessionStore::new()),
            Request::builder()
                .uri("/catalog/mybooks/")
                .header(AUTHORIZATION, token(12, &[], false))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_all_borrowed_requires_permission() {
        let response = send(
            app(MockRepository::default(), MockSessionStore::new()),
            Request::builder()
                .uri("/catalog/borrowed/")
                .header(AUTHORIZATION, token(12, &[], false))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
