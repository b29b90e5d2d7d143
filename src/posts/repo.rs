use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::db::{map_write_error, PgStore, StoreResult};
use crate::posts::repo_types::{NewPost, Post, PostChanges};

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, new: NewPost) -> StoreResult<Post>;
    async fn all(&self) -> StoreResult<Vec<Post>>;
    async fn by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Post>>;
    async fn find(&self, id: Uuid) -> StoreResult<Option<Post>>;
    /// Applies `changes` and bumps `updated_at`. `None` if the post is gone.
    async fn update(&self, id: Uuid, changes: PostChanges) -> StoreResult<Option<Post>>;
    /// `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
impl PostStore for PgStore {
    async fn insert(&self, new: NewPost) -> StoreResult<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, title, content, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "insert post"))
    }

    async fn all(&self) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM posts
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("list posts")?;
        Ok(rows)
    }

    async fn by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("list posts by owner")?;
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let row = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("find post")?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> StoreResult<Option<Post>> {
        let row = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
               SET title      = COALESCE($2, title),
                   content    = COALESCE($3, content),
                   updated_at = now()
             WHERE id = $1
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "update post"))?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete post")?;
        Ok(res.rows_affected() > 0)
    }
}
