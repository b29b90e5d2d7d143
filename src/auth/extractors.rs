use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::{auth::repo_types::User, error::ApiError, state::AppState};

/// Pulls the candidate token out of `Authorization: Bearer <token>`.
/// Only the `Bearer ` prefix is stripped; surrounding whitespace stays part of
/// the candidate and will not match a stored token. Absent, non-UTF-8,
/// non-Bearer and empty values all yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    (!token.is_empty()).then_some(token)
}

/// Identity resolved from the bearer token, `None` when unauthenticated.
/// Stored in the request extensions so the lookup runs once per request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

async fn resolve(parts: &mut Parts, state: &AppState) -> Result<Option<User>, ApiError> {
    if let Some(CurrentUser(cached)) = parts.extensions.get::<CurrentUser>() {
        return Ok(cached.clone());
    }

    let user = match bearer_token(&parts.headers) {
        Some(token) => state.users.find_by_token(token).await?,
        None => None,
    };
    debug!(user_id = ?user.as_ref().map(|u| u.id), "identity resolved");

    parts.extensions.insert(CurrentUser(user.clone()));
    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(resolve(parts, state).await?))
    }
}

/// Requires an authenticated caller; rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .map(AuthUser)
            .ok_or(ApiError::Unauthenticated)
    }
}
