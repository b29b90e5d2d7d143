use serde::Deserialize;

use crate::auth::services::BLANK;
use crate::error::FieldErrors;
use crate::posts::repo_types::PostChanges;

/// Writable post fields. Ownership comes from the token; a client-sent
/// `user_id` is an unknown field and dropped during parsing.
#[derive(Debug, Default, Deserialize)]
pub struct PostParams {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Post body, either flat or wrapped as `{"post": {..}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PostBody {
    Wrapped { post: PostParams },
    Flat(PostParams),
}

impl PostBody {
    pub fn into_inner(self) -> PostParams {
        match self {
            PostBody::Wrapped { post } => post,
            PostBody::Flat(post) => post,
        }
    }
}

fn is_blank(v: &str) -> bool {
    v.trim().is_empty()
}

impl PostParams {
    /// On create both fields must be present and non-blank.
    pub fn validate_new(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.title.as_deref().map_or(true, is_blank) {
            errors.add("title", BLANK);
        }
        if self.content.as_deref().map_or(true, is_blank) {
            errors.add("content", BLANK);
        }
        errors
    }

    /// On update absent fields are kept, present ones must be non-blank.
    pub fn validate_changes(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.title.as_deref().is_some_and(is_blank) {
            errors.add("title", BLANK);
        }
        if self.content.as_deref().is_some_and(is_blank) {
            errors.add("content", BLANK);
        }
        errors
    }

    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            title: self.title,
            content: self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_user_id_is_dropped() {
        let body: PostBody = serde_json::from_str(
            r#"{"post":{"title":"T","content":"C","user_id":"00000000-0000-0000-0000-000000000000"}}"#,
        )
        .unwrap();
        let params = body.into_inner();
        assert_eq!(params.title.as_deref(), Some("T"));
        assert_eq!(params.content.as_deref(), Some("C"));
    }

    #[test]
    fn create_requires_both_fields() {
        let params = PostParams {
            title: Some("  ".into()),
            content: None,
        };
        let errors = params.validate_new();
        assert_eq!(errors.get("title").unwrap(), [BLANK]);
        assert_eq!(errors.get("content").unwrap(), [BLANK]);
    }

    #[test]
    fn update_only_checks_present_fields() {
        let params = PostParams {
            title: Some("new".into()),
            content: None,
        };
        assert!(params.validate_changes().is_empty());

        let params = PostParams {
            title: Some("".into()),
            content: None,
        };
        assert_eq!(params.validate_changes().get("title").unwrap(), [BLANK]);
    }
}
