use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{
    repo::UserStore,
    repo_types::{NewUser, User},
};
use crate::db::{StoreError, StoreResult};
use crate::posts::{
    repo::PostStore,
    repo_types::{NewPost, Post, PostChanges},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
    by_token: HashMap<String, Uuid>,
    posts: Vec<Post>, // insertion order == created_at order
}

/// Process-local store with the same uniqueness rules as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.by_email.contains_key(&new.email) {
            return Err(StoreError::Conflict { field: "email" });
        }
        if t.by_token.contains_key(&new.token) {
            return Err(StoreError::Conflict { field: "token" });
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_digest: new.password_digest,
            token: new.token,
            created_at: now,
            updated_at: now,
        };
        t.by_email.insert(user.email.clone(), user.id);
        t.by_token.insert(user.token.clone(), user.id);
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.by_email.get(email).and_then(|id| t.users.get(id)).cloned())
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.by_token.get(token).and_then(|id| t.users.get(id)).cloned())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert(&self, new: NewPost) -> StoreResult<Post> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&new.user_id) {
            return Err(anyhow::anyhow!("post owner {} does not exist", new.user_id).into());
        }

        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: Uuid::new_v4(),
            title: new.title,
            content: new.content,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        };
        t.posts.push(post.clone());
        Ok(post)
    }

    async fn all(&self) -> StoreResult<Vec<Post>> {
        Ok(self.tables.read().await.posts.clone())
    }

    async fn by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Post>> {
        let t = self.tables.read().await;
        Ok(t.posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let t = self.tables.read().await;
        Ok(t.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> StoreResult<Option<Post>> {
        let mut t = self.tables.write().await;
        let Some(post) = t.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        post.updated_at = OffsetDateTime::now_utc();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.posts.len();
        t.posts.retain(|p| p.id != id);
        Ok(t.posts.len() != before)
    }
}
