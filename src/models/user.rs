use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::{Role, hash_secret};
use crate::error::AppError;
use crate::validation::require_nonblank;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub company_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfile {
    pub full_name: String,
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePassword {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

impl User {
    pub async fn register(pool: &PgPool, input: CreateUser) -> Result<User, AppError> {
        input.validate()?;
        let full_name = require_nonblank("full_name", &input.full_name)?;

        let email_taken: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&input.email)
            .fetch_optional(pool)
            .await?;
        let username_taken: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(&input.username)
                .fetch_optional(pool)
                .await?;
        if email_taken.is_some() || username_taken.is_some() {
            return Err(AppError::Conflict(
                "Email or username already exists".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, username, password_hash, full_name, phone_number) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&input.email)
        .bind(&input.username)
        .bind(hash_secret(&input.password))
        .bind(&full_name)
        .bind(&input.phone_number)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Login lookup: the identifier may be a username or an email.
    pub async fn find_by_identifier(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE (username = $1 OR email = $1) AND is_active",
        )
        .bind(identifier)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(pool)
            .await?;
        Ok(users)
    }

    pub async fn update_profile(
        pool: &PgPool,
        id: i32,
        input: UpdateProfile,
    ) -> Result<User, AppError> {
        input.validate()?;
        let full_name = require_nonblank("full_name", &input.full_name)?;
        let username = require_nonblank("username", &input.username)?;

        Self::get(pool, id).await?;

        let taken: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(&username)
            .fetch_optional(pool)
            .await?;
        if let Some((other_id,)) = taken
            && other_id != id
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET full_name = $2, username = $3, phone_number = $4, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&full_name)
        .bind(&username)
        .bind(input.phone_number.as_deref().map(str::trim))
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub async fn change_password(
        pool: &PgPool,
        id: i32,
        input: ChangePassword,
    ) -> Result<(), AppError> {
        input.validate()?;
        if input.new_password != input.confirm_password {
            return Err(AppError::Validation(
                "New password and confirm password do not match".to_string(),
            ));
        }

        let user = Self::get(pool, id).await?;
        if !user.verify_password(&input.current_password) {
            return Err(AppError::Unauthorized);
        }

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(hash_secret(&input.new_password))
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Soft delete: the account stays on record but can no longer log in.
    pub async fn deactivate(pool: &PgPool, id: i32) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    pub fn verify_password(&self, password: &str) -> bool {
        self.password_hash == hash_secret(password)
    }
}
