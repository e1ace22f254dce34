//! Book model and related types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

static ISBN_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// Publication year (4 digits)
    pub release_date: Option<i32>,
    pub isbn: Option<String>,
    /// Number of copies available for borrowing
    pub count: i32,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(range(min = 1000, max = 9999, message = "Release date must be a 4-digit year"))]
    pub release_date: Option<i32>,
    #[validate(custom(function = validate_isbn))]
    pub isbn: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default = "default_count")]
    pub count: i32,
}

fn default_count() -> i32 {
    1
}

/// Update book request (full replacement)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(range(min = 1000, max = 9999, message = "Release date must be a 4-digit year"))]
    pub release_date: Option<i32>,
    #[validate(custom(function = validate_isbn))]
    pub isbn: Option<String>,
    #[validate(range(min = 0))]
    pub count: i32,
}

/// Partial update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookPartial {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,
    #[validate(range(min = 1000, max = 9999, message = "Release date must be a 4-digit year"))]
    pub release_date: Option<i32>,
    #[validate(custom(function = validate_isbn))]
    pub isbn: Option<String>,
    #[validate(range(min = 0))]
    pub count: Option<i32>,
}

/// ISBN rule: after stripping hyphens the value must be 10 or 13 digits.
pub fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    let clean = isbn.replace('-', "");
    if ISBN_DIGITS.is_match(&clean) && (clean.len() == 10 || clean.len() == 13) {
        Ok(())
    } else {
        let mut err = ValidationError::new("isbn_format");
        err.message = Some("Invalid ISBN format".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn isbn_accepts_10_and_13_digit_forms() {
        assert!(validate_isbn("0306406152").is_ok());
        assert!(validate_isbn("978-0-306-40615-7").is_ok());
        assert!(validate_isbn("9780306406157").is_ok());
    }

    #[test]
    fn isbn_rejects_malformed_values() {
        assert!(validate_isbn("isbn").is_err());
        assert!(validate_isbn("12345").is_err());
        assert!(validate_isbn("97803064061570").is_err());
        assert!(validate_isbn("978-0-306-4061X-7").is_err());
    }

    #[test]
    fn create_book_validates_release_year() {
        let book = CreateBook {
            title: "Test".to_string(),
            author: "Author".to_string(),
            release_date: Some(99),
            isbn: None,
            count: 1,
        };
        assert!(book.validate().is_err());

        let book = CreateBook {
            release_date: Some(1997),
            ..book
        };
        assert!(book.validate().is_ok());
    }

    #[test]
    fn create_book_rejects_negative_count() {
        let book = CreateBook {
            title: "Test".to_string(),
            author: "Author".to_string(),
            release_date: None,
            isbn: None,
            count: -1,
        };
        assert!(book.validate().is_err());
    }
}
