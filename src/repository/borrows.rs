//! Borrows repository: transactional borrowing rules
//!
//! Borrow and return each run in a single database transaction. The book row
//! is locked with `SELECT ... FOR UPDATE` so two concurrent borrows of the
//! same title serialize on the count check and the count can never go
//! negative; the partial unique index on active records backs the
//! one-active-borrow-per-(reader, book) rule.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, borrow::BorrowRecord},
    repository::is_unique_violation,
};

/// Maximum number of unreturned books a single user may hold
pub const MAX_ACTIVE_BORROWS: i64 = 3;

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book: decrement its count and insert an active record.
    ///
    /// Preconditions are checked in order: book exists, copies available,
    /// reader exists, reader below the per-user cap.
    pub async fn borrow(&self, reader_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        // Lock the book row for the whole transaction
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Not find book".to_string()))?;

        if book.count == 0 {
            return Err(AppError::LimitExceeded(
                "These books are not available".to_string(),
            ));
        }

        let reader_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(reader_id)
                .fetch_one(&mut *tx)
                .await?;

        if !reader_exists {
            return Err(AppError::NotFound("Not find user".to_string()));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM receiving_books WHERE reader_id = $1 AND return_date IS NULL",
        )
        .bind(reader_id)
        .fetch_one(&mut *tx)
        .await?;

        tracing::debug!("User {} currently holds {} book(s)", reader_id, active);

        if active >= MAX_ACTIVE_BORROWS {
            return Err(AppError::LimitExceeded(format!(
                "The user has {} books",
                MAX_ACTIVE_BORROWS
            )));
        }

        sqlx::query("UPDATE books SET count = count - 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO receiving_books (book_id, reader_id)
            VALUES ($1, $2)
            RETURNING id, book_id, reader_id, borrow_date, return_date
            "#,
        )
        .bind(book_id)
        .bind(reader_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("The user already has this book".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        tx.commit().await?;

        Ok(record)
    }

    /// Return a book: stamp the active record and increment the book count
    pub async fn return_book(&self, reader_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT id, book_id, reader_id, borrow_date, return_date
            FROM receiving_books
            WHERE reader_id = $1 AND book_id = $2
            ORDER BY borrow_date DESC
            LIMIT 1
            "#,
        )
        .bind(reader_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("The user does not have this book".to_string()))?;

        if record.return_date.is_some() {
            return Err(AppError::NotFound(
                "The book has already been returned".to_string(),
            ));
        }

        let now = Utc::now();

        // Conditional stamp: a concurrent return of the same record loses the
        // race here instead of incrementing the count a second time
        let stamped = sqlx::query(
            "UPDATE receiving_books SET return_date = $1 WHERE id = $2 AND return_date IS NULL",
        )
        .bind(now)
        .bind(record.id)
        .execute(&mut *tx)
        .await?;

        if stamped.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "The book has already been returned".to_string(),
            ));
        }

        let updated = sqlx::query("UPDATE books SET count = count + 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Not find book".to_string()));
        }

        tx.commit().await?;

        Ok(BorrowRecord {
            return_date: Some(now),
            ..record
        })
    }

    /// Get the books a user currently holds (active records only)
    pub async fn get_user_books(&self, user_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author, b.release_date, b.isbn, b.count
            FROM books b
            JOIN receiving_books r ON r.book_id = b.id
            WHERE r.reader_id = $1 AND r.return_date IS NULL
            ORDER BY r.borrow_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}
