//! Registration and login.

use axum::{extract::State, Json};
use mediavault_core::models::User;
use mediavault_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::auth::{jwt, password};
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: uuid::Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            bio: user.bio,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserOut>, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let hashed = password::hash_password(&request.password)?;
    let user = state
        .users
        .create(&request.email, &hashed, request.full_name.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, HttpAppError> {
    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .filter(|u| password::verify_password(&request.password, &u.hashed_password))
        .ok_or_else(|| AppError::Unauthorized("Incorrect email or password".to_string()))?;

    let access_token = jwt::create_token(
        &user.email,
        &state.config.jwt_secret,
        state.config.jwt_expiry_minutes,
    )?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
