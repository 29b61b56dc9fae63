//! Ingestion orchestration: the per-upload pipeline.
//!
//! Sequence per upload: validate declared MIME family → sanitize filename
//! and derive the storage key → upload the original (fatal on failure) →
//! create the media row → associate tags → kind-specific enrichment.
//! Enrichment sub-steps (probe, thumbnail, each rendition) are independent
//! and best-effort: their failures leave fields unset and never abort the
//! upload. An original uploaded before a failed row insert is left as an
//! orphaned object; there is no reconciliation.

use mediavault_core::models::{
    AudioMetadata, ImageMetadata, MediaAsset, MediaType, User, VideoMetadata, PURPOSE_LISTING,
};
use mediavault_core::{sanitize_filename, AppError};
use mediavault_db::{MediaRepository, TagRepository};
use mediavault_processing::video::RENDITION_HEIGHTS;
use mediavault_processing::{image, AudioAnalyzer, Prober, VideoTranscoder};
use mediavault_storage::{keys, Storage};
use std::sync::Arc;
use uuid::Uuid;

/// Timestamp of the representative video frame.
const VIDEO_THUMBNAIL_SECONDS: f64 = 1.0;

/// A parsed upload request, ready for ingestion.
#[derive(Debug)]
pub struct IngestRequest {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub description: Option<String>,
    pub is_public: bool,
    /// Trimmed, non-empty, first-seen-wins tag names.
    pub tags: Vec<String>,
    pub genre: Option<String>,
}

#[derive(Clone)]
pub struct IngestService {
    media: MediaRepository,
    tags: TagRepository,
    storage: Arc<dyn Storage>,
    prober: Prober,
    audio: AudioAnalyzer,
    transcoder: Arc<VideoTranscoder>,
}

impl IngestService {
    pub fn new(
        media: MediaRepository,
        tags: TagRepository,
        storage: Arc<dyn Storage>,
        prober: Prober,
        audio: AudioAnalyzer,
        transcoder: Arc<VideoTranscoder>,
    ) -> Self {
        Self {
            media,
            tags,
            storage,
            prober,
            audio,
            transcoder,
        }
    }

    /// Run the ingestion pipeline. `expected` is the endpoint's media
    /// family; a mismatched declared content type is rejected before any
    /// I/O happens.
    pub async fn ingest(
        &self,
        owner: &User,
        expected: MediaType,
        request: IngestRequest,
    ) -> Result<MediaAsset, AppError> {
        let classified = MediaType::from_mime(&request.content_type);
        if classified != expected {
            return Err(AppError::InvalidInput(format!(
                "Expected {}/* content type, got {}",
                expected, request.content_type
            )));
        }

        let safe_name = sanitize_filename(&request.filename);
        let s3_key = keys::original_key(owner.id, classified, &safe_name);

        // The original must be durable before any row references it.
        self.storage
            .put(&s3_key, request.data.clone(), &request.content_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let media_id = Uuid::new_v4();
        let asset = self
            .media
            .create(
                media_id,
                owner.id,
                &safe_name,
                request.description.as_deref(),
                &s3_key,
                &request.content_type,
                request.data.len() as i64,
                request.is_public,
                classified,
            )
            .await?;

        tracing::info!(
            media_id = %media_id,
            owner_id = %owner.id,
            media_type = %classified,
            size_bytes = request.data.len(),
            "Media ingestion started"
        );

        if !request.tags.is_empty() {
            let tags = self.tags.ensure(&request.tags).await?;
            self.tags.attach(media_id, &tags).await?;
        }

        match classified {
            MediaType::Image => self.enrich_image(owner, &asset, &request.data).await,
            MediaType::Video => {
                self.enrich_video(owner, &asset, &request.data, request.genre.as_deref())
                    .await
            }
            MediaType::Audio => {
                self.enrich_audio(&asset, &request.data, request.genre.as_deref())
                    .await
            }
            MediaType::Other => {}
        }

        Ok(asset)
    }

    /// Generate a thumbnail record from encoded bytes: upload, insert the
    /// row, and return its id. `None` on any failure — thumbnails are
    /// always best-effort.
    async fn store_thumbnail(
        &self,
        owner: &User,
        asset: &MediaAsset,
        data: Vec<u8>,
        width: Option<i32>,
        height: Option<i32>,
        content_type: &str,
        extension: &str,
    ) -> Option<Uuid> {
        let key = keys::thumbnail_key(
            owner.id,
            asset.media_type,
            asset.id,
            PURPOSE_LISTING,
            extension,
        );
        let size = data.len() as i64;

        if let Err(e) = self.storage.put(&key, data, content_type).await {
            tracing::warn!(media_id = %asset.id, error = %e, "Thumbnail upload failed");
            return None;
        }

        match self
            .media
            .insert_thumbnail(asset.id, &key, width, height, Some(size), PURPOSE_LISTING)
            .await
        {
            Ok(row) => Some(row.id),
            Err(e) => {
                tracing::warn!(media_id = %asset.id, error = %e, "Thumbnail row insert failed");
                None
            }
        }
    }

    async fn enrich_image(&self, owner: &User, asset: &MediaAsset, data: &[u8]) {
        let mut meta = ImageMetadata::default();

        match image::extract_metadata(data) {
            Ok(info) => {
                meta.width = Some(info.width as i32);
                meta.height = Some(info.height as i32);
                meta.color_depth = Some(info.color_depth as i32);
                meta.dpi_x = info.dpi_x;
                meta.dpi_y = info.dpi_y;
                meta.exif = serde_json::to_value(&info.exif).ok();
            }
            Err(e) => {
                tracing::warn!(media_id = %asset.id, error = %e, "Image metadata extraction failed");
            }
        }

        match image::generate_thumbnail(data) {
            Ok(thumb) => {
                meta.main_thumbnail_id = self
                    .store_thumbnail(
                        owner,
                        asset,
                        thumb.data,
                        Some(thumb.width as i32),
                        Some(thumb.height as i32),
                        thumb.content_type,
                        thumb.extension,
                    )
                    .await;
            }
            Err(e) => {
                tracing::warn!(media_id = %asset.id, error = %e, "Image thumbnail generation failed");
            }
        }

        if let Err(e) = self.media.insert_image_metadata(asset.id, &meta).await {
            tracing::warn!(media_id = %asset.id, error = %e, "Image metadata insert failed");
        }
    }

    async fn enrich_video(
        &self,
        owner: &User,
        asset: &MediaAsset,
        data: &[u8],
        genre: Option<&str>,
    ) {
        let probe = self.prober.probe_video(data).await;
        let mut meta = VideoMetadata {
            duration_seconds: probe.duration_seconds,
            width: probe.width,
            height: probe.height,
            frame_rate: probe.frame_rate,
            video_codec: probe.video_codec,
            audio_codec: probe.audio_codec,
            bitrate: probe.bitrate,
            genre: genre.map(String::from),
            ..Default::default()
        };

        if let Some(jpeg) = self
            .transcoder
            .generate_thumbnail(data, VIDEO_THUMBNAIL_SECONDS)
            .await
        {
            let (width, height) = match image::extract_metadata(&jpeg) {
                Ok(info) => (Some(info.width as i32), Some(info.height as i32)),
                Err(_) => (None, None),
            };
            meta.main_thumbnail_id = self
                .store_thumbnail(owner, asset, jpeg, width, height, "image/jpeg", "jpg")
                .await;
        }

        // Each rendition is generated and uploaded independently; a
        // failed height leaves only its own reference unset.
        for target_height in RENDITION_HEIGHTS {
            let Some(bytes) = self
                .transcoder
                .generate_rendition(data, target_height, None)
                .await
            else {
                continue;
            };

            let key = keys::rendition_key(owner.id, asset.id, target_height);
            if let Err(e) = self.storage.put(&key, bytes, "video/mp4").await {
                tracing::warn!(
                    media_id = %asset.id,
                    target_height = target_height,
                    error = %e,
                    "Rendition upload failed"
                );
                continue;
            }

            match target_height {
                1080 => meta.url_1080 = Some(key),
                720 => meta.url_720 = Some(key),
                480 => meta.url_480 = Some(key),
                _ => {}
            }
        }

        if let Err(e) = self.media.insert_video_metadata(asset.id, &meta).await {
            tracing::warn!(media_id = %asset.id, error = %e, "Video metadata insert failed");
        }
    }

    async fn enrich_audio(&self, asset: &MediaAsset, data: &[u8], genre: Option<&str>) {
        let probe = self.audio.extract(data).await;
        let meta = AudioMetadata {
            duration_seconds: probe.duration_seconds,
            bitrate: probe.bitrate,
            sample_rate: probe.sample_rate,
            channels: probe.channels,
            genre: genre.map(String::from),
        };

        if let Err(e) = self.media.insert_audio_metadata(asset.id, &meta).await {
            tracing::warn!(media_id = %asset.id, error = %e, "Audio metadata insert failed");
        }
    }
}
