//! Media deletion: object-store objects first, then the row (cascade
//! removes owned metadata/thumbnail/tag-link rows).

use axum::extract::{Path, State};
use axum::Json;
use mediavault_core::AppError;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HttpAppError> {
    let asset = state
        .media
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

    if asset.owner_id != Some(user.id) {
        return Err(HttpAppError(AppError::Forbidden(
            "Not authorized".to_string(),
        )));
    }

    // Object deletes are fire-and-forget idempotent; a failed delete
    // leaves an orphaned object, never a failed request.
    for key in state.media.storage_keys(id).await? {
        if let Err(e) = state.storage.delete(&key).await {
            tracing::warn!(media_id = %id, key = %key, error = %e, "Object delete failed");
        }
    }

    state.media.delete(id).await?;
    tracing::info!(media_id = %id, owner_id = %user.id, "Media deleted");

    Ok(Json(json!({ "ok": true })))
}
