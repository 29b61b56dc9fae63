//! Media read endpoints: listing, detail, presigned access.

use axum::extract::{Path, Query, State};
use axum::Json;
use mediavault_core::models::{
    pick_display_thumbnail, MediaAsset, MediaKindMetadata, Thumbnail,
};
use mediavault_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn list_media(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MediaAsset>>, HttpAppError> {
    let limit = query.limit.clamp(1, 200);
    let assets = state
        .media
        .list(query.q.as_deref(), limit, query.offset.max(0))
        .await?;
    Ok(Json(assets))
}

#[derive(Debug, Serialize)]
pub struct MediaDetail {
    #[serde(flatten)]
    pub asset: MediaAsset,
    pub metadata: MediaKindMetadata,
    pub thumbnails: Vec<Thumbnail>,
    pub tags: Vec<String>,
    /// Presigned URL for the preferred display thumbnail, when one exists
    /// and signing succeeds.
    pub display_thumbnail_url: Option<String>,
}

pub async fn get_media(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaDetail>, HttpAppError> {
    let asset = state
        .media
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

    let metadata = state.media.kind_metadata(id, asset.media_type).await?;
    let thumbnails = state.media.thumbnails_for(id).await?;
    let tags = state
        .tags
        .tags_for(id)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect();

    let expiry = Duration::from_secs(state.config.presign_expiry_secs);
    let display_thumbnail_url = match pick_display_thumbnail(&thumbnails) {
        Some(thumb) => state.storage.presigned_url(&thumb.s3_key, expiry).await,
        None => None,
    };

    Ok(Json(MediaDetail {
        asset,
        metadata,
        thumbnails,
        tags,
        display_thumbnail_url,
    }))
}

#[derive(Debug, Serialize)]
pub struct PresignedUrlResponse {
    pub url: String,
}

pub async fn media_url(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PresignedUrlResponse>, HttpAppError> {
    let asset = state
        .media
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

    let expiry = Duration::from_secs(state.config.presign_expiry_secs);
    let url = state
        .storage
        .presigned_url(&asset.s3_key, expiry)
        .await
        .ok_or_else(|| AppError::Internal("Could not generate URL".to_string()))?;

    Ok(Json(PresignedUrlResponse { url }))
}
