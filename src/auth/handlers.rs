use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterBody, TokenResponse},
        extractors::AuthUser,
        services::{check_credentials, normalize_email, register_user, INVALID_CREDENTIALS},
    },
    error::{ApiError, FieldErrors},
    extract::JsonBody,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterBody>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let req = payload.into_inner();
    let user = match register_user(state.users.as_ref(), req.email, req.password).await {
        Ok(u) => u,
        Err(ApiError::Validation(fields)) => {
            warn!(?fields, "registration rejected");
            return Err(ApiError::Validation(fields));
        }
        Err(e) => return Err(e),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(TokenResponse { token: user.token })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let email = normalize_email(payload.email.as_deref().unwrap_or_default());
    let password = payload.password.unwrap_or_default();

    match check_credentials(state.users.as_ref(), &email, &password).await? {
        Some(user) => {
            info!(user_id = %user.id, email = %user.email, "user logged in");
            Ok(Json(user.into()))
        }
        None => {
            warn!(email = %email, "login rejected");
            Err(ApiError::Validation(FieldErrors::single(
                "base",
                INVALID_CREDENTIALS,
            )))
        }
    }
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(user.into())
}
