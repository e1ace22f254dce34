//! Library circulation endpoints: borrow, return, user holdings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book::Book, borrow::BorrowRecord, borrow::BorrowRequest},
};

use super::AuthenticatedUser;

/// Return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub result: String,
}

/// Borrow a book for a reader
#[utoipa::path(
    post,
    path = "/library/borrow",
    tag = "library",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Borrow record created", body = BorrowRecord),
        (status = 400, description = "No copies available or borrowing limit reached"),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "The user already has this book")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    claims.require_superuser()?;

    let record = state
        .services
        .library
        .borrow_book(request.reader_id, request.book_id)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/library/return",
    tag = "library",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "No active borrow record for this pair")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<ReturnResponse>)> {
    claims.require_superuser()?;

    state
        .services
        .library
        .return_book(request.reader_id, request.book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReturnResponse {
            result: "The book has been returned to the library".to_string(),
        }),
    ))
}

/// Get the books a user currently holds
#[utoipa::path(
    get,
    path = "/library/{user_id}/",
    tag = "library",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Books currently held by the user", body = Vec<Book>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.library.get_user_books(user_id).await?;
    Ok(Json(books))
}
