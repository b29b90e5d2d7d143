use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Registration fields. Missing fields are reported as validation errors
/// rather than rejected by the JSON extractor.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration body, either flat or wrapped as `{"user": {..}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RegisterBody {
    Wrapped { user: RegisterRequest },
    Flat(RegisterRequest),
}

impl RegisterBody {
    pub fn into_inner(self) -> RegisterRequest {
        match self {
            RegisterBody::Wrapped { user } => user,
            RegisterBody::Flat(user) => user,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response to a successful registration.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public part of the user returned to its owner.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            token: u.token,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_body_accepts_flat_and_wrapped() {
        let flat: RegisterBody =
            serde_json::from_str(r#"{"email":"a@b.io","password":"pw"}"#).unwrap();
        let wrapped: RegisterBody =
            serde_json::from_str(r#"{"user":{"email":"a@b.io","password":"pw"}}"#).unwrap();

        for body in [flat, wrapped] {
            let req = body.into_inner();
            assert_eq!(req.email.as_deref(), Some("a@b.io"));
            assert_eq!(req.password.as_deref(), Some("pw"));
        }
    }

    #[test]
    fn register_body_tolerates_missing_fields() {
        let body: RegisterBody = serde_json::from_str("{}").unwrap();
        let req = body.into_inner();
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }

    #[test]
    fn public_user_never_carries_digest() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            password_digest: "$argon2id$secret".into(),
            token: "tok".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"token\":\"tok\""));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
