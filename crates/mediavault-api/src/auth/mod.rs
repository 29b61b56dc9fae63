//! Bearer authentication: token issuance, verification, and the
//! `CurrentUser` extractor that resolves the request's account.

pub mod jwt;
pub mod password;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mediavault_core::models::User;
use mediavault_core::AppError;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::state::AppState;

/// The authenticated user for the current request. Extraction fails with
/// 401 on a missing/invalid bearer token or an inactive account.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            HttpAppError(AppError::Unauthorized("Missing bearer token".to_string()))
        })?;

        let claims = jwt::verify_token(token, &state.config.jwt_secret)?;

        let user = state
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

        if !user.is_active {
            return Err(HttpAppError(AppError::Unauthorized(
                "Account is inactive".to_string(),
            )));
        }

        Ok(CurrentUser(user))
    }
}
