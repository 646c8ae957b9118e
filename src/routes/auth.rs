use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};

use crate::db::models::{LoginRequest, NewUser, TokenResponse, UserCreate, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::services::auth::{
    create_access_token, hash_password, verify_password, AdminUser, CurrentUser,
};
use crate::utils::config::AppState;

pub async fn login_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    tracing::info!("Login attempt for user: {}", payload.username);

    let user = app_state
        .store
        .get_user_by_username(&payload.username)
        .await?
        .filter(|user| verify_password(&payload.password, &user.hashed_password))
        .ok_or_else(|| {
            tracing::warn!("❌ Invalid credentials for user: {}", payload.username);
            AppError::Unauthorized("Incorrect username or password".to_string())
        })?;

    if !user.is_active {
        return Err(AppError::Validation("User is inactive".to_string()));
    }

    let access_token = create_access_token(
        &user.username,
        &app_state.config.secret_key,
        app_state.config.access_token_expire_minutes,
    )?;

    tracing::info!("✅ User logged in: {}", user.username);
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

pub async fn me_handler(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

pub async fn register_handler(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserResponse>> {
    tracing::info!("{} is registering user: {}", admin.username, payload.username);

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "username and password must not be empty".to_string(),
        ));
    }
    if !payload.email.contains('@') {
        return Err(AppError::Validation("email is not valid".to_string()));
    }
    if app_state.store.get_user_by_username(&payload.username).await?.is_some() {
        return Err(AppError::Conflict("Username is already taken".to_string()));
    }
    if app_state.store.get_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let user = app_state
        .store
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            hashed_password: hash_password(&payload.password)?,
            is_admin: false,
        })
        .await?;

    tracing::info!("✅ User registered: {}", user.id);
    Ok(Json(user.into()))
}

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/me", get(me_handler))
        .route("/auth/register", post(register_handler))
}
