// Auth handlers
// Registration and login

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    auth::password,
    error::{ApiError, ApiResult},
    models::user::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
    state::AppState,
};

/// Register a new user
/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::Validation)?;

    info!("Registering user with email: {}", request.email.trim());

    let password_hash = password::hash(&request.password)?;
    let user = state.users.create_user(request.into_user(password_hash)).await?;

    info!("Registered user with id: {}", user.id);
    Ok((StatusCode::CREATED, Json(MessageResponse::new("User registered"))))
}

/// Exchange email and password for a signed token
/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let email = request.normalized_email();

    let user = state
        .users
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::InvalidCredentials("Invalid credentials".to_string()))?;

    if !password::verify(&request.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials("Invalid password".to_string()));
    }

    let token = state.tokens.issue(user.id)?;

    info!("User {} logged in", user.id);
    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            token,
            user_id: user.id,
        }),
    ))
}
