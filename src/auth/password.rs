//! Argon2id password digests. Hashing is CPU-bound, so every call runs on
//! tokio's blocking pool instead of an async worker.

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;

/// Longest accepted password, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    /// Digest checked against when the email is unknown, so both login
    /// failures cost one verification.
    static ref DECOY_DIGEST: Option<String> = digest_of("postboard decoy password").ok();
}

fn digest_of(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(plain.as_bytes(), &salt)?
        .to_string())
}

fn matches(plain: &str, digest: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(digest)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Digest of `plain` with a fresh random salt, as a PHC string.
pub async fn hash_password(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || digest_of(&plain))
        .await
        .context("password hashing task failed")?
        .map_err(|e| anyhow::anyhow!("argon2 hash: {e}"))
}

/// `Ok(false)` on mismatch; a digest that does not parse is an error.
pub async fn verify_password(plain: &str, digest: &str) -> anyhow::Result<bool> {
    let (plain, digest) = (plain.to_owned(), digest.to_owned());
    tokio::task::spawn_blocking(move || matches(&plain, &digest))
        .await
        .context("password verification task failed")?
        .map_err(|e| anyhow::anyhow!("argon2 verify: {e}"))
}

/// Burns one verification against the decoy digest. Always fails.
pub async fn verify_decoy(plain: &str) {
    let plain = plain.to_owned();
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(digest) = DECOY_DIGEST.as_deref() {
            let _ = matches(&plain, digest);
        }
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify_roundtrip() {
        let digest = hash_password("Secur3P@ssw0rd!").await.unwrap();
        assert!(verify_password("Secur3P@ssw0rd!", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn digest_is_salted_and_not_plaintext() {
        let a = hash_password("same-password").await.unwrap();
        let b = hash_password("same-password").await.unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("same-password"));
        assert!(a.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() {
        let digest = hash_password("correct-horse-battery-staple").await.unwrap();
        assert!(!verify_password("wrong-password", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn verify_errors_on_malformed_digest() {
        let err = verify_password("anything", "not-a-valid-hash").await.unwrap_err();
        assert!(err.to_string().contains("argon2 verify"));
    }

    #[tokio::test]
    async fn decoy_digest_is_real_and_never_matches_users() {
        let decoy = DECOY_DIGEST.as_deref().expect("decoy digest");
        assert!(decoy.starts_with("$argon2id$"));
        assert!(!matches("hunter2", decoy).unwrap());
        verify_decoy("hunter2").await;
    }
}
