use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::{
    error::ApiError,
    handlers::{
        astro::compute_positions,
        auth::{login, register},
        health_check,
        posts::{create_post, delete_post, list_posts, update_post},
        root,
    },
    middleware::{create_middleware_stack, require_auth},
    state::AppState,
};

/// Router-level switches taken from the configuration.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub cors_origin: String,
    /// Require a bearer token for creating, updating and deleting posts.
    pub posts_require_auth: bool,
}

impl Default for RouterSettings {
    fn default() -> Self {
        RouterSettings {
            cors_origin: "http://localhost:3000".to_string(),
            posts_require_auth: false,
        }
    }
}

/// Create the Axum router with all endpoints and middleware
pub fn create_router(state: AppState, settings: &RouterSettings) -> Result<Router, ApiError> {
    let mut post_writes = Router::new()
        .route("/api/posts", post(create_post))
        .route("/api/posts/:id", put(update_post).delete(delete_post));

    if settings.posts_require_auth {
        post_writes = post_writes.route_layer(from_fn_with_state(state.clone(), require_auth));
    }

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // Authentication
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        // Posts
        .route("/api/posts", get(list_posts))
        .merge(post_writes)
        // Astrology
        .route("/api/astro", post(compute_positions))
        .with_state(state)
        .layer(create_middleware_stack(&settings.cors_origin)?);

    Ok(router)
}
