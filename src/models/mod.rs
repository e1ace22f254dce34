//! Data models for Libris

pub mod book;
pub mod borrow;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use borrow::BorrowRecord;
pub use user::{User, UserClaims};
