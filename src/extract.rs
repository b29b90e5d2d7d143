use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, FieldErrors};

/// `Json<T>` whose rejection renders as a 422 field map like every other
/// validation failure.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

impl<T: DeserializeOwned> JsonBody<T> {
    /// Parses an already-buffered body, for handlers that must check access
    /// before looking at the payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ApiError> {
        let Json(value) = Json::<T>::from_bytes(bytes)?;
        Ok(JsonBody(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(FieldErrors::single("base", &rejection.body_text()))
    }
}
