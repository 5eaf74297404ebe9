//! Handle database requests.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::user::User;

const SELECT_BY_EMAIL: &str = r#"SELECT
        email,
        password_hash,
        full_name,
        status,
        role,
        approved_at,
        created_at,
        updated_at
    FROM users
    WHERE email = ?"#;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert [`User`] into database.
    ///
    /// Fails with a conflict when the email is already taken.
    pub async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO users (email, password_hash, full_name, status, role, approved_at, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.status)
        .bind(user.role)
        .bind(user.approved_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find a user using `email` field.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(SELECT_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Update credentials, profile and lifecycle of an existing user.
    pub async fn update(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"UPDATE users
                SET password_hash = ?, full_name = ?, status = ?, role = ?, approved_at = ?, updated_at = ?
                WHERE email = ?"#,
        )
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.status)
        .bind(user.role)
        .bind(user.approved_at)
        .bind(user.updated_at)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count rows for an email. The unique constraint keeps this at 0 or 1.
    pub async fn count_by_email(&self, email: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM users WHERE email = ?"#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
