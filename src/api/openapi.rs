//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, catalog, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocalLibrary API",
        version = "0.1.0",
        description = "Catalog and loan management for a small local library",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::index,
        catalog::list_books,
        catalog::get_book,
        catalog::list_authors,
        catalog::get_author,
        catalog::list_available,
        // Loans
        loans::my_books,
        loans::all_borrowed,
        loans::renewal_form,
        loans::renew_book,
        // Administration
        admin::create_author,
        admin::update_author,
        admin::delete_author,
        admin::list_genres,
        admin::create_genre,
        admin::update_genre,
        admin::delete_genre,
        admin::list_languages,
        admin::create_language,
        admin::update_language,
        admin::delete_language,
        admin::create_book,
        admin::update_book,
        admin::delete_book,
        admin::create_instance,
        admin::update_instance,
        admin::delete_instance,
        admin::delete_user,
    ),
    components(
        schemas(
            // Catalog
            catalog::DashboardResponse,
            crate::models::author::Author,
            crate::models::author::AuthorDetail,
            crate::models::author::AuthorInput,
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetail,
            crate::models::book::BookInput,
            crate::models::genre::Genre,
            crate::models::genre::GenreInput,
            crate::models::language::Language,
            crate::models::language::LanguageInput,
            crate::models::enums::LanguageName,
            crate::models::enums::LoanStatus,
            // Copies and loans
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BookInstanceSummary,
            crate::models::book_instance::BookInstanceInput,
            crate::models::loan::RenewalSubmission,
            crate::models::loan::RenewalForm,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Catalog browsing"),
        (name = "loans", description = "Borrowed copies and renewals"),
        (name = "admin", description = "Staff catalog administration")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by guarded paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
