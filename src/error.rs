use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::db::StoreError;
use crate::posts::policy::Forbidden;

pub const UNAUTHENTICATED_MESSAGE: &str = "Please Log in.";
pub const FORBIDDEN_MESSAGE: &str = "You are not allowed to perform this action.";
pub const NOT_FOUND_MESSAGE: &str = "Couldn't find Post";

/// Field-level validation messages, rendered as `{"field": ["message", ..]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(fields) => (status, Json(fields)).into_response(),
            ApiError::Unauthenticated => {
                (status, Json(json!({ "errors": UNAUTHENTICATED_MESSAGE }))).into_response()
            }
            ApiError::Forbidden => {
                (status, Json(json!({ "errors": FORBIDDEN_MESSAGE }))).into_response()
            }
            ApiError::NotFound => {
                (status, Json(json!({ "errors": NOT_FOUND_MESSAGE }))).into_response()
            }
            ApiError::Internal(e) => {
                error!(error = ?e, "internal error");
                (status, Json(json!({ "errors": "Internal server error" }))).into_response()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { field } => {
                ApiError::Validation(FieldErrors::single(field, "has already been taken"))
            }
            StoreError::Backend(e) => ApiError::Internal(e),
        }
    }
}

impl From<Forbidden> for ApiError {
    fn from(_: Forbidden) -> Self {
        ApiError::Forbidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthenticated_renders_fixed_body() {
        let res = ApiError::Unauthenticated.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await, json!({ "errors": "Please Log in." }));
    }

    #[tokio::test]
    async fn validation_renders_field_map_as_body() {
        let mut fields = FieldErrors::new();
        fields.add("email", "can't be blank");
        fields.add("email", "is invalid");
        fields.add("password", "can't be blank");

        let res = ApiError::Validation(fields).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(res).await,
            json!({
                "email": ["can't be blank", "is invalid"],
                "password": ["can't be blank"],
            })
        );
    }

    #[tokio::test]
    async fn internal_error_hides_cause() {
        let res = ApiError::from(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert!(!body.to_string().contains("connection refused"));
    }

    #[test]
    fn store_conflict_becomes_taken_message() {
        let err = ApiError::from(StoreError::Conflict { field: "email" });
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(fields.get("email").unwrap(), ["has already been taken"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
        assert!(FieldErrors::single("title", "can't be blank")
            .into_result()
            .is_err());
    }
}
