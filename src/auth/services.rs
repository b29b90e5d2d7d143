use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error};

use crate::auth::{
    password::{hash_password, verify_decoy, verify_password, MAX_PASSWORD_BYTES},
    repo::UserStore,
    repo_types::{NewUser, User},
    token::generate_token,
};
use crate::error::{ApiError, FieldErrors};

pub const BLANK: &str = "can't be blank";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Collects every field problem with a registration attempt.
pub(crate) fn validate_registration(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if email.is_empty() {
        errors.add("email", BLANK);
    } else if !is_valid_email(email) {
        errors.add("email", "is invalid");
    }

    if password.is_empty() {
        errors.add("password", BLANK);
    } else if password.len() > MAX_PASSWORD_BYTES {
        errors.add("password", "is too long (maximum is 72 characters)");
    }

    errors
}

/// Validates, hashes and stores a new user with a fresh token.
pub(crate) async fn register_user(
    users: &dyn UserStore,
    email: Option<String>,
    password: Option<String>,
) -> Result<User, ApiError> {
    let email = normalize_email(email.as_deref().unwrap_or_default());
    let password = password.unwrap_or_default();

    validate_registration(&email, &password).into_result()?;

    let password_digest = hash_password(&password).await.map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Validation(FieldErrors::single("password_digest", BLANK))
    })?;

    let user = users
        .create(NewUser {
            email,
            password_digest,
            token: generate_token(),
        })
        .await?;
    Ok(user)
}

/// Returns the user when `email`/`password` match, `None` for an unknown
/// email or a wrong password. Both failures cost one Argon2 verification.
pub(crate) async fn check_credentials(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<Option<User>, ApiError> {
    let Some(user) = users.find_by_email(email).await? else {
        verify_decoy(password).await;
        debug!(email = %email, "login unknown email");
        return Ok(None);
    };

    if verify_password(password, &user.password_digest).await? {
        Ok(Some(user))
    } else {
        debug!(user_id = %user.id, "login invalid password");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn email_format() {
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.io"));
        assert!(!is_valid_email("@c.io"));
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn reports_all_registration_problems() {
        let errors = validate_registration("", "");
        assert_eq!(errors.get("email").unwrap(), [BLANK]);
        assert_eq!(errors.get("password").unwrap(), [BLANK]);

        let errors = validate_registration("nope", &"x".repeat(73));
        assert_eq!(errors.get("email").unwrap(), ["is invalid"]);
        assert_eq!(
            errors.get("password").unwrap(),
            ["is too long (maximum is 72 characters)"]
        );

        assert!(validate_registration("a@b.io", "pw").is_empty());
    }

    #[tokio::test]
    async fn registered_token_resolves_to_user() {
        let store = MemoryStore::default();
        let user = register_user(&store, Some("A@B.io".into()), Some("secret".into()))
            .await
            .unwrap();
        assert_eq!(user.email, "a@b.io");
        assert_ne!(user.password_digest, "secret");

        let found = store.find_by_token(&user.token).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_validation_error() {
        let store = MemoryStore::default();
        register_user(&store, Some("a@b.io".into()), Some("secret".into()))
            .await
            .unwrap();
        let err = register_user(&store, Some(" a@B.io".into()), Some("other".into()))
            .await
            .unwrap_err();
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(fields.get("email").unwrap(), ["has already been taken"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn credentials_check() {
        let store = MemoryStore::default();
        let user = register_user(&store, Some("a@b.io".into()), Some("secret".into()))
            .await
            .unwrap();

        let ok = check_credentials(&store, "a@b.io", "secret").await.unwrap();
        assert_eq!(ok.map(|u| u.token), Some(user.token));

        assert!(check_credentials(&store, "a@b.io", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(check_credentials(&store, "ghost@b.io", "secret")
            .await
            .unwrap()
            .is_none());
    }
}
