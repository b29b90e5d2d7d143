use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    extract::JsonBody,
    posts::{
        dto::PostBody,
        policy::authorize,
        repo_types::{NewPost, Post},
    },
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(show_post)
                .patch(update_post)
                .put(update_post)
                .delete(destroy_post),
        )
        .route("/me/posts", get(my_posts))
}

/// Unknown and malformed ids are both "not found".
async fn load_post(state: &AppState, raw_id: &str) -> Result<Post, ApiError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| ApiError::NotFound)?;
    state.posts.find(id).await?.ok_or(ApiError::NotFound)
}

#[instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.all().await?))
}

#[instrument(skip(state))]
pub async fn show_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(load_post(&state, &id).await?))
}

#[instrument(skip_all)]
pub async fn my_posts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.by_owner(user.id).await?))
}

#[instrument(skip(state, user, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<PostBody>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let params = payload.into_inner();
    params.validate_new().into_result()?;

    let post = state
        .posts
        .insert(NewPost {
            title: params.title.unwrap_or_default(),
            content: params.content.unwrap_or_default(),
            user_id: user.id,
        })
        .await?;

    info!(post_id = %post.id, user_id = %user.id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// The body is parsed only after the ownership check, so a non-owner always
/// sees 403 whatever they sent.
#[instrument(skip(state, user, body))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Post>, ApiError> {
    let post = load_post(&state, &id).await?;
    if let Err(e) = authorize(&user, &post) {
        warn!(post_id = %post.id, user_id = %user.id, "caller does not own post");
        return Err(e.into());
    }

    let JsonBody(payload) = JsonBody::<PostBody>::from_bytes(&body)?;
    let params = payload.into_inner();
    params.validate_changes().into_result()?;

    let updated = state
        .posts
        .update(post.id, params.into_changes())
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(post_id = %updated.id, user_id = %user.id, "post updated");
    Ok(Json(updated))
}

#[instrument(skip(state, user))]
pub async fn destroy_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let post = load_post(&state, &id).await?;
    if let Err(e) = authorize(&user, &post) {
        warn!(post_id = %post.id, user_id = %user.id, "caller does not own post");
        return Err(e.into());
    }

    if !state.posts.delete(post.id).await? {
        return Err(ApiError::NotFound);
    }

    info!(post_id = %post.id, user_id = %user.id, "post destroyed");
    Ok(StatusCode::NO_CONTENT)
}
