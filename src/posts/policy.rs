use crate::{auth::repo_types::User, posts::repo_types::Post};

/// The caller is authenticated but does not own the target post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not allowed to perform this action")]
pub struct Forbidden;

/// Only the owner may mutate a post.
pub fn authorize(user: &User, post: &Post) -> Result<(), Forbidden> {
    if post.user_id == user.id {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "owner@example.com".into(),
            password_digest: "digest".into(),
            token: "token".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn post_of(owner: &User) -> Post {
        Post {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            user_id: owner.id,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn owner_is_allowed() {
        let owner = user();
        assert_eq!(authorize(&owner, &post_of(&owner)), Ok(()));
    }

    #[test]
    fn other_user_is_forbidden() {
        let owner = user();
        let other = user();
        assert_eq!(authorize(&other, &post_of(&owner)), Err(Forbidden));
    }
}
