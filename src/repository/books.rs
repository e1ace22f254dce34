//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook, UpdateBookPartial},
    repository::is_unique_violation,
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found!", id)))
    }

    /// List all books ordered by title
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, release_date, isbn, count)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, author, release_date, isbn, count
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.release_date)
        .bind(&book.isbn)
        .bind(book.count)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("A book with this ISBN already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(created)
    }

    /// Update an existing book (full replacement)
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author = $2, release_date = $3, isbn = $4, count = $5
            WHERE id = $6
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.release_date)
        .bind(&book.isbn)
        .bind(book.count)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("A book with this ISBN already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found!", id)));
        }

        self.get_by_id(id).await
    }

    /// Partially update an existing book
    pub async fn update_partial(&self, id: i32, book: &UpdateBookPartial) -> AppResult<Book> {
        let mut sets = Vec::new();
        let mut param_idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(book.title, "title");
        add_field!(book.author, "author");
        add_field!(book.release_date, "release_date");
        add_field!(book.isbn, "isbn");
        add_field!(book.count, "count");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE books SET {} WHERE id = ${}",
            sets.join(", "),
            param_idx
        );

        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(book.title);
        bind_field!(book.author);
        bind_field!(book.release_date);
        bind_field!(book.isbn);
        bind_field!(book.count);

        builder.bind(id).execute(&self.pool).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("A book with this ISBN already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        self.get_by_id(id).await
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found!", id)));
        }

        Ok(())
    }
}
