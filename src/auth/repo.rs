use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::db::{map_write_error, PgStore, StoreResult};

/// Credential store: user records keyed by id, email and token.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Duplicate email or token is `StoreError::Conflict`.
    async fn create(&self, new: NewUser) -> StoreResult<User>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Exact match on the bearer token.
    async fn find_by_token(&self, token: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_digest, token)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_digest, token, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.password_digest)
        .bind(&new.token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "insert user"))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_digest, token, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_digest, token, created_at, updated_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .context("find user by token")?;
        Ok(user)
    }
}
