//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, library, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Library Management REST API"
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users
        users::login,
        users::logout,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::update_user_partial,
        users::delete_user,
        // Books
        books::create_book,
        books::list_books,
        books::get_book,
        books::update_book,
        books::update_book_partial,
        books::delete_book,
        // Library
        library::borrow_book,
        library::return_book,
        library::get_user_books,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UpdateUserPartial,
            users::LoginRequest,
            users::LoginResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::UpdateBookPartial,
            // Library
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowRequest,
            library::ReturnResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management and authentication"),
        (name = "books", description = "Book catalog management"),
        (name = "library", description = "Borrowing and returning books")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
