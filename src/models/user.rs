//! User model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::AppError;

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub is_superuser: bool,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 2, message = "Username must be at least 2 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom(function = validate_password_strength))]
    pub password: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Update user request (full replacement)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 2, message = "Username must be at least 2 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Partial update user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPartial {
    #[validate(length(min = 2, message = "Username must be at least 2 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(custom(function = validate_password_strength))]
    pub password: Option<String>,
}

/// Password rule: at least 8 characters mixing lower case, upper case,
/// a digit and a punctuation character.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.len() >= 8;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_punct = password.chars().any(|c| c.is_ascii_punctuation());

    if long_enough && has_lower && has_upper && has_digit && has_punct {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength"))
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub is_superuser: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Require superuser privileges
    pub fn require_superuser(&self) -> Result<(), AppError> {
        if self.is_superuser {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Superuser privileges required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn password_strength_accepts_mixed_password() {
        assert!(validate_password_strength("1qaz!QAZ").is_ok());
    }

    #[test]
    fn password_strength_rejects_weak_passwords() {
        assert!(validate_password_strength("short1!A").is_ok());
        assert!(validate_password_strength("alllowercase1!").is_err());
        assert!(validate_password_strength("ALLUPPERCASE1!").is_err());
        assert!(validate_password_strength("NoDigits!!").is_err());
        assert!(validate_password_strength("NoPunct123a").is_err());
        assert!(validate_password_strength("Sh0rt!").is_err());
    }

    #[test]
    fn claims_token_round_trip() {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: "admin@example.com".to_string(),
            user_id: 1,
            is_superuser: true,
            exp: now + 3600,
            iat: now,
        };

        let token = claims.create_token("test-secret").unwrap();
        let decoded = UserClaims::from_token(&token, "test-secret").unwrap();

        assert_eq!(decoded.user_id, 1);
        assert!(decoded.is_superuser);
        assert_eq!(decoded.sub, "admin@example.com");
    }

    #[test]
    fn claims_token_rejects_wrong_secret() {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: "admin@example.com".to_string(),
            user_id: 1,
            is_superuser: false,
            exp: now + 3600,
            iat: now,
        };

        let token = claims.create_token("test-secret").unwrap();
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
