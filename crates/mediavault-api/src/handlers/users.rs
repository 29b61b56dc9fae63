//! Profile endpoints for the authenticated user.

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::CurrentUser;
use crate::error::HttpAppError;
use crate::handlers::auth::UserOut;
use crate::state::AppState;

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserOut> {
    Json(user.into())
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub bio: Option<String>,
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserOut>, HttpAppError> {
    let updated = state
        .users
        .update_profile(
            user.id,
            request.full_name.as_deref(),
            request.bio.as_deref(),
        )
        .await?;
    Ok(Json(updated.into()))
}
