//! Catalog query service: counts, listings and detail pages.
//!
//! Every call reads current state; nothing is cached between requests.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetail},
        book::{BookDetail, BookSummary},
        book_instance::{BookInstanceSummary, InstanceFilter, InstanceSort},
        genre::genre_summary,
        EntityKind, LoanStatus, Page,
    },
    repository::Repository,
};

/// Genres shown in compact listings
pub const GENRE_SUMMARY_LIMIT: usize = 3;

/// Home page counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardCounts {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn count_all(&self, kind: EntityKind) -> AppResult<i64> {
        self.repository.counts.count_all(kind).await
    }

    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        self.repository.counts.count_by_status(status).await
    }

    pub async fn dashboard_counts(&self) -> AppResult<DashboardCounts> {
        Ok(DashboardCounts {
            num_books: self.count_all(EntityKind::Book).await?,
            num_instances: self.count_all(EntityKind::BookInstance).await?,
            num_instances_available: self.count_by_status(LoanStatus::Available).await?,
            num_authors: self.count_all(EntityKind::Author).await?,
        })
    }

    /// Check the database is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.counts.ping().await
    }

    pub async fn list_books(&self, page: Page) -> AppResult<(Vec<BookSummary>, i64)> {
        self.repository.books.list(page).await
    }

    pub async fn book_detail(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.repository.books.find_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.find_by_id(author_id).await?),
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => Some(self.repository.languages.find_by_id(language_id).await?),
            None => None,
        };

        let genres = self.repository.books.genres(id).await?;
        let filter = InstanceFilter {
            book_id: Some(id),
            ..Default::default()
        };
        let (copies, number_of_copies) = self
            .repository
            .instances
            .list(&filter, InstanceSort::DueBack, None)
            .await?;

        Ok(BookDetail {
            genre_summary: genre_summary(&genres, GENRE_SUMMARY_LIMIT),
            book,
            author,
            language,
            genres,
            copies,
            number_of_copies,
        })
    }

    /// Comma-joined names of up to `limit` genres of a book
    pub async fn genre_summary(&self, book_id: i32, limit: usize) -> AppResult<String> {
        let genres = self.repository.books.genres(book_id).await?;
        Ok(genre_summary(&genres, limit))
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn author_detail(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.repository.authors.find_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    /// Copies that can be borrowed right now
    pub async fn list_available_copies(&self) -> AppResult<Vec<BookInstanceSummary>> {
        let filter = InstanceFilter {
            status: Some(LoanStatus::Available),
            ..Default::default()
        };
        let (copies, _) = self
            .repository
            .instances
            .list(&filter, InstanceSort::DueBack, None)
            .await?;
        Ok(copies)
    }

    /// Copies on loan to one user, soonest due first
    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: Page,
    ) -> AppResult<(Vec<BookInstanceSummary>, i64)> {
        let filter = InstanceFilter {
            status: Some(LoanStatus::OnLoan),
            borrower_id: Some(user_id),
            book_id: None,
        };
        self.repository
            .instances
            .list(&filter, InstanceSort::DueBack, Some(page))
            .await
    }

    /// Every copy on loan, grouped by borrower
    pub async fn list_all_borrowed(&self, page: Page) -> AppResult<(Vec<BookInstanceSummary>, i64)> {
        let filter = InstanceFilter {
            status: Some(LoanStatus::OnLoan),
            ..Default::default()
        };
        self.repository
            .instances
            .list(&filter, InstanceSort::Borrower, Some(page))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{book::Book, genre::Genre},
        repository::testing::MockRepository,
    };
    use mockall::predicate::eq;

    fn book(author_id: Option<i32>) -> Book {
        Book {
            id: 1,
            title: "Earthsea".to_string(),
            summary: String::new(),
            isbn: "9780547773742".to_string(),
            author_id,
            language_id: None,
        }
    }

    fn genre(id: i32, name: &str) -> Genre {
        Genre {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let mut repo = MockRepository::default();
        repo.counts
            .expect_count_all()
            .with(eq(EntityKind::Book))
            .returning(|_| Ok(4));
        repo.counts
            .expect_count_all()
            .with(eq(EntityKind::BookInstance))
            .returning(|_| Ok(9));
        repo.counts
            .expect_count_all()
            .with(eq(EntityKind::Author))
            .returning(|_| Ok(2));
        repo.counts
            .expect_count_by_status()
            .with(eq(LoanStatus::Available))
            .returning(|_| Ok(5));

        let counts = CatalogService::new(repo.build()).dashboard_counts().await.unwrap();
        assert_eq!(
            counts,
            DashboardCounts {
                num_books: 4,
                num_instances: 9,
                num_instances_available: 5,
                num_authors: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_list_for_user_filters_on_loan_copies_of_that_user() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_list()
            .withf(|filter, sort, page| {
                filter.status == Some(LoanStatus::OnLoan)
                    && filter.borrower_id == Some(42)
                    && filter.book_id.is_none()
                    && *sort == InstanceSort::DueBack
                    && *page == Some(Page::new(2, 10))
            })
            .times(1)
            .returning(|_, _, _| Ok((Vec::new(), 0)));

        let service = CatalogService::new(repo.build());
        service.list_for_user(42, Page::new(2, 10)).await.unwrap();
    }

    #[tokio::test]
    async fn test_all_borrowed_sorted_by_borrower() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_list()
            .withf(|filter, sort, _| {
                filter.status == Some(LoanStatus::OnLoan)
                    && filter.borrower_id.is_none()
                    && *sort == InstanceSort::Borrower
            })
            .times(1)
            .returning(|_, _, _| Ok((Vec::new(), 0)));

        let service = CatalogService::new(repo.build());
        service.list_all_borrowed(Page::new(1, 10)).await.unwrap();
    }

    #[tokio::test]
    async fn test_genre_summary_limits_names() {
        let mut repo = MockRepository::default();
        repo.books.expect_genres().with(eq(1)).returning(|_| {
            Ok(vec![
                genre(3, "Fantasy"),
                genre(1, "Adventure"),
                genre(2, "Young Adult"),
                genre(4, "Classic"),
            ])
        });

        let service = CatalogService::new(repo.build());
        let summary = service.genre_summary(1, GENRE_SUMMARY_LIMIT).await.unwrap();
        assert_eq!(summary, "Fantasy, Adventure, Young Adult");
    }

    #[tokio::test]
    async fn test_book_detail_without_author_or_language() {
        let mut repo = MockRepository::default();
        repo.books.expect_find_by_id().returning(|_| Ok(book(None)));
        repo.books
            .expect_genres()
            .returning(|_| Ok(vec![genre(1, "Fantasy")]));
        repo.instances
            .expect_list()
            .withf(|filter, _, page| filter.book_id == Some(1) && page.is_none())
            .returning(|_, _, _| Ok((Vec::new(), 0)));
        repo.authors.expect_find_by_id().never();

        let detail = CatalogService::new(repo.build()).book_detail(1).await.unwrap();
        assert!(detail.author.is_none());
        assert!(detail.language.is_none());
        assert_eq!(detail.genre_summary, "Fantasy");
        assert_eq!(detail.number_of_copies, 0);
    }

    #[tokio::test]
    async fn test_missing_book_is_not_found() {
        let mut repo = MockRepository::default();
        repo.books
            .expect_find_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Book with id {} not found", id))));

        let err = CatalogService::new(repo.build())
            .book_detail(99)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
