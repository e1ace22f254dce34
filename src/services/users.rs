//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, UpdateUserPartial, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate a user by email and return a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!("The user with the username: {} not found", email))
            })?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Validation(format!(
                "Error password for login: {}",
                email
            )));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Create a JWT token for the given user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            is_superuser: user.is_superuser,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a password against the stored argon2 hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let Some(ref hash) = user.hashed_password else {
            return Ok(false);
        };

        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Hash a password with argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Register a new user; rejects duplicate email addresses
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict(
                "The email address is already in use".to_string(),
            ));
        }

        let hashed = match user.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        tracing::info!("Creating user {} with email {}", user.username, user.email);

        self.repository
            .users
            .create(&user.username, &user.email, hashed, user.is_superuser)
            .await
    }

    /// Update a user (full replacement)
    pub async fn update_user(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // Ensure the user exists before updating
        self.repository.users.get_by_id(id).await?;
        self.repository.users.update(id, &user).await
    }

    /// Partially update a user
    pub async fn update_user_partial(&self, id: i32, user: UpdateUserPartial) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.users.get_by_id(id).await?;

        let hashed = match user.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.repository.users.update_partial(id, &user, hashed).await
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        tracing::info!("Deleting user {}", id);
        self.repository.users.delete(id).await
    }
}
