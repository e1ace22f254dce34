//! Borrow (receiving) record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A row representing one user's active or historical custody of one book copy
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    pub book_id: i32,
    pub reader_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

/// Borrow/return request: identifies a (reader, book) pair
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub reader_id: i32,
    pub book_id: i32,
}
