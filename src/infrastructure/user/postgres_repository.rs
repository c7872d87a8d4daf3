//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::user::{normalize_email, User, UserId, UserRepository, UserStatus};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

const USER_COLUMNS: &str = "id, email, name, password_hash, status, email_verified, \
                            created_at, updated_at, last_login_at";

/// PostgreSQL implementation of UserRepository over the `users` table
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            USER_COLUMNS
        );

        sqlx::query(&query)
            .bind(user.id().as_str())
            .bind(user.email())
            .bind(user.name())
            .bind(user.password_hash())
            .bind(user.status().as_str())
            .bind(user.is_email_verified())
            .bind(user.created_at())
            .bind(user.updated_at())
            .bind(user.last_login_at())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::conflict(format!("Email '{}' is already registered", user.email()))
                } else {
                    DomainError::storage(format!("Failed to create user: {}", e))
                }
            })?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, name = $3, password_hash = $4, status = $5,
                email_verified = $6, updated_at = $7, last_login_at = $8
            WHERE id = $1
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.email())
        .bind(user.name())
        .bind(user.password_hash())
        .bind(user.status().as_str())
        .bind(user.is_email_verified())
        .bind(user.updated_at())
        .bind(user.last_login_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Email '{}' is already registered", user.email()))
            } else {
                DomainError::storage(format!("Failed to update user: {}", e))
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", user.id())));
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
        let rows = match status {
            Some(s) => {
                let query = format!(
                    "SELECT {} FROM users WHERE status = $1 ORDER BY created_at",
                    USER_COLUMNS
                );
                sqlx::query(&query)
                    .bind(s.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let query = format!("SELECT {} FROM users ORDER BY created_at", USER_COLUMNS);
                sqlx::query(&query).fetch_all(&self.pool).await
            }
        }
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
        let count: i64 = match status {
            Some(s) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE status = $1")
                    .bind(s.as_str())
                    .fetch_one(&self.pool)
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count.max(0) as usize)
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to record login: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        Ok(())
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::storage(format!("Failed to read column '{}': {}", name, e)))
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let id: String = column(row, "id")?;
    let status: String = column(row, "status")?;

    let id = UserId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;
    let status = UserStatus::parse(&status).ok_or_else(|| {
        DomainError::storage(format!("Invalid user status in database: '{}'", status))
    })?;

    Ok(User::from_parts(
        id,
        column(row, "email")?,
        column(row, "name")?,
        column(row, "password_hash")?,
        status,
        column(row, "email_verified")?,
        column::<DateTime<Utc>>(row, "created_at")?,
        column::<DateTime<Utc>>(row, "updated_at")?,
        column::<Option<DateTime<Utc>>>(row, "last_login_at")?,
    ))
}
