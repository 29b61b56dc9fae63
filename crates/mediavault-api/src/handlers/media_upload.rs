//! Upload endpoints, one per media family.

use axum::extract::{Multipart, State};
use axum::Json;
use mediavault_core::models::{parse_tag_list, MediaAsset, MediaType};
use mediavault_core::AppError;
use std::sync::Arc;

use crate::auth::CurrentUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::services::ingest::IngestRequest;

/// Pull the upload form out of the multipart body: a required `file`
/// part plus optional `description`, `is_public`, `tags`, `genre`.
async fn parse_upload(mut multipart: Multipart) -> Result<IngestRequest, AppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut description = None;
    let mut is_public = false;
    let mut tags = Vec::new();
    let mut genre = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?
                    .to_vec();
                file = Some((filename, content_type, data));
            }
            "description" => {
                description = field.text().await.ok().filter(|s| !s.is_empty());
            }
            "is_public" => {
                let raw = field.text().await.unwrap_or_default();
                is_public = matches!(raw.as_str(), "true" | "1");
            }
            "tags" => {
                if let Ok(raw) = field.text().await {
                    tags = parse_tag_list(&raw);
                }
            }
            "genre" => {
                genre = field.text().await.ok().filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::InvalidInput("Missing 'file' field".to_string()))?;
    if data.is_empty() {
        return Err(AppError::InvalidInput("Empty file".to_string()));
    }

    Ok(IngestRequest {
        filename,
        content_type,
        data,
        description,
        is_public,
        tags,
        genre,
    })
}

async fn upload(
    state: Arc<AppState>,
    user: CurrentUser,
    expected: MediaType,
    multipart: Multipart,
) -> Result<Json<MediaAsset>, HttpAppError> {
    let request = parse_upload(multipart).await?;

    let max_size = state.config.max_size_for(expected);
    if request.data.len() > max_size {
        return Err(HttpAppError(AppError::PayloadTooLarge(format!(
            "{} bytes exceeds the {} byte limit",
            request.data.len(),
            max_size
        ))));
    }

    let asset = state.ingest.ingest(&user.0, expected, request).await?;
    Ok(Json(asset))
}

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<MediaAsset>, HttpAppError> {
    upload(state, user, MediaType::Image, multipart).await
}

pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<MediaAsset>, HttpAppError> {
    upload(state, user, MediaType::Video, multipart).await
}

pub async fn upload_audio(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<MediaAsset>, HttpAppError> {
    upload(state, user, MediaType::Audio, multipart).await
}
