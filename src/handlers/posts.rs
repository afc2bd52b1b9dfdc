// Post handlers
// HTTP handlers for post management operations

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthenticatedUser,
    models::post::{parse_post_id, Post, PostDocument},
    state::AppState,
};

/// List every post, newest first
/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    info!("Fetching all posts");

    let posts = state.posts.list_posts().await?;

    info!("Retrieved {} posts", posts.len());
    Ok((StatusCode::OK, Json(posts)))
}

/// Create a new post
/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    caller: Option<Extension<AuthenticatedUser>>,
    payload: Result<Json<PostDocument>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(document) = payload?;
    let document = document.without_reserved_keys();
    document.validate_for_create().map_err(ApiError::Validation)?;

    if let Some(Extension(caller)) = caller {
        info!("Creating new post for user_id: {}", caller.id);
    } else {
        info!("Creating new post");
    }

    let post = state.posts.create_post(Post::new(document)).await?;

    info!("Successfully created post with id: {}", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

/// Merge fields into an existing post
/// PUT /api/posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    payload: Result<Json<PostDocument>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_post_id(&post_id).map_err(ApiError::Validation)?;
    let Json(changes) = payload?;
    let changes = changes.without_reserved_keys();
    changes.validate_for_update().map_err(ApiError::Validation)?;

    info!("Updating post with id: {}", id);

    let post = state.posts.update_post(id, changes).await?;

    Ok((StatusCode::OK, Json(post)))
}

/// Delete a post
/// DELETE /api/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_post_id(&post_id).map_err(ApiError::Validation)?;

    info!("Deleting post with id: {}", id);

    state.posts.delete_post(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
