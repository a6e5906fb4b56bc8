//! Staff maintenance of catalog records

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::AuthorInput,
        book::BookInput,
        book_instance::BookInstanceInput,
        genre::GenreInput,
        language::LanguageInput,
        Author, Book, BookInstance, Genre, Language,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AdminService {
    repository: Repository,
}

impl AdminService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Authors

    pub async fn save_author(&self, id: Option<i32>, data: AuthorInput) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors.save(id, &data).await?;
        tracing::info!("Saved author {} ({})", author.id, author.display_name());
        Ok(author)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // Genres

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn save_genre(&self, id: Option<i32>, data: GenreInput) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.repository.genres.save(id, &data).await?;
        tracing::info!("Saved genre {} ({})", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }

    // Languages

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages.list().await
    }

    pub async fn save_language(&self, id: Option<i32>, data: LanguageInput) -> AppResult<Language> {
        let language = self.repository.languages.save(id, &data).await?;
        tracing::info!("Saved language {} ({})", language.id, language.name);
        Ok(language)
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.languages.delete(id).await
    }

    // Books

    /// Referenced author, language and genres must exist
    pub async fn save_book(&self, id: Option<i32>, data: BookInput) -> AppResult<Book> {
        data.validate()?;

        if let Some(author_id) = data.author_id {
            self.ensure_exists(self.repository.authors.find_by_id(author_id).await)?;
        }
        if let Some(language_id) = data.language_id {
            self.ensure_exists(self.repository.languages.find_by_id(language_id).await)?;
        }
        for genre_id in data.unique_genre_ids() {
            self.ensure_exists(self.repository.genres.find_by_id(genre_id).await)?;
        }

        let book = self.repository.books.save(id, &data).await?;
        tracing::info!("Saved book {} ({})", book.id, book.title);
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    // Copies

    pub async fn save_instance(
        &self,
        id: Option<Uuid>,
        data: BookInstanceInput,
    ) -> AppResult<BookInstance> {
        data.validate()?;

        if let Some(book_id) = data.book_id {
            self.ensure_exists(self.repository.books.find_by_id(book_id).await)?;
        }
        if let Some(borrower_id) = data.borrower_id {
            self.ensure_exists(self.repository.users.find_by_id(borrower_id).await)?;
        }

        let instance = self.repository.instances.save(id, &data).await?;
        tracing::info!("Saved book instance {} ({})", instance.id, instance.status);
        Ok(instance)
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.instances.delete(id).await
    }

    // Users

    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await
    }

    /// A dangling reference in the payload is the caller's fault
    fn ensure_exists<T>(&self, lookup: AppResult<T>) -> AppResult<()> {
        match lookup {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(msg)) => Err(AppError::BadRequest(msg)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{LanguageName, LoanStatus},
        repository::testing::MockRepository,
    };
    use chrono::NaiveDate;

    fn book_input(genre_ids: Vec<i32>) -> BookInput {
        BookInput {
            title: "The Dispossessed".to_string(),
            summary: String::new(),
            isbn: "9780061054884".to_string(),
            author_id: Some(1),
            language_id: None,
            genre_ids,
        }
    }

    fn author(id: i32) -> Author {
        Author {
            id,
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    #[tokio::test]
    async fn test_invalid_author_is_rejected_before_storage() {
        let mut repo = MockRepository::default();
        repo.authors.expect_save().never();

        let input = AuthorInput {
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1929, 10, 21),
            date_of_death: NaiveDate::from_ymd_opt(1900, 1, 1),
        };
        let err = AdminService::new(repo.build())
            .save_author(None, input)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_book_with_unknown_genre_is_bad_request() {
        let mut repo = MockRepository::default();
        repo.authors.expect_find_by_id().returning(|id| Ok(author(id)));
        repo.genres.expect_find_by_id().returning(|id| {
            if id == 1 {
                Ok(Genre {
                    id,
                    name: "Science Fiction".to_string(),
                })
            } else {
                Err(AppError::NotFound(format!("Genre with id {} not found", id)))
            }
        });
        repo.books.expect_save().never();

        let err = AdminService::new(repo.build())
            .save_book(None, book_input(vec![1, 9]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_book_saved_when_references_exist() {
        let mut repo = MockRepository::default();
        repo.authors.expect_find_by_id().returning(|id| Ok(author(id)));
        repo.genres.expect_find_by_id().times(1).returning(|id| {
            Ok(Genre {
                id,
                name: "Science Fiction".to_string(),
            })
        });
        repo.books
            .expect_save()
            .withf(|id, data| id.is_none() && data.unique_genre_ids() == vec![2])
            .times(1)
            .returning(|_, data| {
                Ok(Book {
                    id: 10,
                    title: data.title.clone(),
                    summary: data.summary.clone(),
                    isbn: data.isbn.clone(),
                    author_id: data.author_id,
                    language_id: data.language_id,
                })
            });

        let book = AdminService::new(repo.build())
            .save_book(None, book_input(vec![2, 2]))
            .await
            .unwrap();
        assert_eq!(book.id, 10);
    }

    #[tokio::test]
    async fn test_instance_with_unknown_borrower_is_bad_request() {
        let mut repo = MockRepository::default();
        repo.users
            .expect_find_by_id()
            .returning(|id| Err(AppError::NotFound(format!("User with id {} not found", id))));
        repo.instances.expect_save().never();

        let input = BookInstanceInput {
            book_id: None,
            imprint: "Harper, 1974".to_string(),
            due_back: None,
            borrower_id: Some(5),
            status: LoanStatus::OnLoan,
        };
        let err = AdminService::new(repo.build())
            .save_instance(None, input)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_still_referenced_conflict_is_passed_through() {
        let mut repo = MockRepository::default();
        repo.languages
            .expect_delete()
            .returning(|_| Err(AppError::Conflict("Language is still referenced".to_string())));

        let err = AdminService::new(repo.build())
            .delete_language(1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_language_saved() {
        let mut repo = MockRepository::default();
        repo.languages.expect_save().times(1).returning(|id, data| {
            Ok(Language {
                id: id.unwrap_or(3),
                name: data.name,
            })
        });

        let language = AdminService::new(repo.build())
            .save_language(
                None,
                LanguageInput {
                    name: LanguageName::Japanese,
                },
            )
            .await
            .unwrap();
        assert_eq!(language.name, LanguageName::Japanese);
    }
}
