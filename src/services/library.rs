//! Library circulation service: borrowing and returning books

use crate::{
    error::AppResult,
    models::{book::Book, borrow::BorrowRecord},
    repository::Repository,
};

#[derive(Clone)]
pub struct LibraryService {
    repository: Repository,
}

impl LibraryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for a reader
    pub async fn borrow_book(&self, reader_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        tracing::info!("Borrow request: reader {} book {}", reader_id, book_id);
        self.repository.borrows.borrow(reader_id, book_id).await
    }

    /// Return a borrowed book
    pub async fn return_book(&self, reader_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        tracing::info!("Return request: reader {} book {}", reader_id, book_id);
        self.repository.borrows.return_book(reader_id, book_id).await
    }

    /// Get the books a user currently holds
    pub async fn get_user_books(&self, user_id: i32) -> AppResult<Vec<Book>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrows.get_user_books(user_id).await
    }
}
