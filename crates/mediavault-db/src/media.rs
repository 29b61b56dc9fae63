//! Media repository: asset rows, thumbnails, and per-kind metadata.
//!
//! The asset row is the aggregation root; metadata and thumbnail rows
//! cascade on delete. Metadata tables key on `media_id`, so at most one
//! metadata row of the matching kind can exist per asset.

use mediavault_core::models::{
    AudioMetadata, ImageMetadata, MediaAsset, MediaKindMetadata, MediaType, Thumbnail,
    VideoMetadata,
};
use mediavault_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the asset row. Callers must have uploaded the original to
    /// `s3_key` already; from here on the row means "ingestion started".
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        id: Uuid,
        owner_id: Uuid,
        filename: &str,
        description: Option<&str>,
        s3_key: &str,
        mimetype: &str,
        size: i64,
        is_public: bool,
        media_type: MediaType,
    ) -> Result<MediaAsset, AppError> {
        let asset = sqlx::query_as::<_, MediaAsset>(
            r#"
            INSERT INTO media (id, owner_id, filename, description, s3_key, mimetype, size, is_public, media_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(filename)
        .bind(description)
        .bind(s3_key)
        .bind(mimetype)
        .bind(size)
        .bind(is_public)
        .bind(media_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(asset)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        let asset = sqlx::query_as::<_, MediaAsset>("SELECT * FROM media WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(asset)
    }

    /// Newest-first listing with an optional substring filter over
    /// filename and description.
    pub async fn list(
        &self,
        q: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MediaAsset>, AppError> {
        let assets = match q {
            Some(q) => {
                let term = format!("%{}%", q);
                sqlx::query_as::<_, MediaAsset>(
                    r#"
                    SELECT * FROM media
                    WHERE filename ILIKE $1 OR description ILIKE $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(term)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MediaAsset>(
                    "SELECT * FROM media ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(assets)
    }

    /// Delete the asset row; owned metadata/thumbnail/tag-link rows go
    /// with it via cascade.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Media {} not found", id)));
        }
        Ok(())
    }

    /// Every storage key owned by the asset: the original, all
    /// thumbnails, and any rendition references. Used before deletion.
    pub async fn storage_keys(&self, id: Uuid) -> Result<Vec<String>, AppError> {
        let mut keys = Vec::new();

        if let Some(asset) = self.get(id).await? {
            keys.push(asset.s3_key);
        }

        let thumb_keys: Vec<(String,)> =
            sqlx::query_as("SELECT s3_key FROM thumbnails WHERE media_id = $1")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
        keys.extend(thumb_keys.into_iter().map(|(k,)| k));

        let rendition_keys: Vec<(Option<String>, Option<String>, Option<String>)> =
            sqlx::query_as(
                "SELECT url_1080, url_720, url_480 FROM video_metadata WHERE media_id = $1",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        for (u1080, u720, u480) in rendition_keys {
            keys.extend([u1080, u720, u480].into_iter().flatten());
        }

        Ok(keys)
    }

    pub async fn insert_thumbnail(
        &self,
        media_id: Uuid,
        s3_key: &str,
        width: Option<i32>,
        height: Option<i32>,
        size: Option<i64>,
        purpose: &str,
    ) -> Result<Thumbnail, AppError> {
        let thumbnail = sqlx::query_as::<_, Thumbnail>(
            r#"
            INSERT INTO thumbnails (id, media_id, s3_key, width, height, size, purpose)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(media_id)
        .bind(s3_key)
        .bind(width)
        .bind(height)
        .bind(size)
        .bind(purpose)
        .fetch_one(&self.pool)
        .await?;
        Ok(thumbnail)
    }

    pub async fn thumbnails_for(&self, media_id: Uuid) -> Result<Vec<Thumbnail>, AppError> {
        let thumbnails = sqlx::query_as::<_, Thumbnail>(
            "SELECT * FROM thumbnails WHERE media_id = $1 ORDER BY created_at",
        )
        .bind(media_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(thumbnails)
    }

    pub async fn insert_image_metadata(
        &self,
        media_id: Uuid,
        meta: &ImageMetadata,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO image_metadata (media_id, width, height, color_depth, dpi_x, dpi_y, exif, main_thumbnail_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(media_id)
        .bind(meta.width)
        .bind(meta.height)
        .bind(meta.color_depth)
        .bind(meta.dpi_x)
        .bind(meta.dpi_y)
        .bind(meta.exif.as_ref())
        .bind(meta.main_thumbnail_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_video_metadata(
        &self,
        media_id: Uuid,
        meta: &VideoMetadata,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO video_metadata
                (media_id, duration_seconds, width, height, frame_rate, video_codec,
                 audio_codec, bitrate, genre, main_thumbnail_id, url_1080, url_720, url_480)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(media_id)
        .bind(meta.duration_seconds)
        .bind(meta.width)
        .bind(meta.height)
        .bind(meta.frame_rate)
        .bind(meta.video_codec.as_deref())
        .bind(meta.audio_codec.as_deref())
        .bind(meta.bitrate)
        .bind(meta.genre.as_deref())
        .bind(meta.main_thumbnail_id)
        .bind(meta.url_1080.as_deref())
        .bind(meta.url_720.as_deref())
        .bind(meta.url_480.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_audio_metadata(
        &self,
        media_id: Uuid,
        meta: &AudioMetadata,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audio_metadata (media_id, duration_seconds, bitrate, sample_rate, channels, genre)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(media_id)
        .bind(meta.duration_seconds)
        .bind(meta.bitrate)
        .bind(meta.sample_rate)
        .bind(meta.channels)
        .bind(meta.genre.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Load the metadata row matching the asset's classified kind. Rows
    /// for other kinds are never created, so a single lookup suffices.
    pub async fn kind_metadata(
        &self,
        media_id: Uuid,
        media_type: MediaType,
    ) -> Result<MediaKindMetadata, AppError> {
        let meta = match media_type {
            MediaType::Image => sqlx::query_as::<_, ImageMetadata>(
                r#"
                SELECT width, height, color_depth, dpi_x, dpi_y, exif, main_thumbnail_id
                FROM image_metadata WHERE media_id = $1
                "#,
            )
            .bind(media_id)
            .fetch_optional(&self.pool)
            .await?
            .map(MediaKindMetadata::Image),
            MediaType::Video => sqlx::query_as::<_, VideoMetadata>(
                r#"
                SELECT duration_seconds, width, height, frame_rate, video_codec, audio_codec,
                       bitrate, genre, main_thumbnail_id, url_1080, url_720, url_480
                FROM video_metadata WHERE media_id = $1
                "#,
            )
            .bind(media_id)
            .fetch_optional(&self.pool)
            .await?
            .map(MediaKindMetadata::Video),
            MediaType::Audio => sqlx::query_as::<_, AudioMetadata>(
                r#"
                SELECT duration_seconds, bitrate, sample_rate, channels, genre
                FROM audio_metadata WHERE media_id = $1
                "#,
            )
            .bind(media_id)
            .fetch_optional(&self.pool)
            .await?
            .map(MediaKindMetadata::Audio),
            MediaType::Other => None,
        };

        // A missing row (enrichment never completed) still presents as the
        // kind-matching variant, with every field unset.
        Ok(meta.unwrap_or_else(|| match media_type {
            MediaType::Image => MediaKindMetadata::Image(ImageMetadata::default()),
            MediaType::Video => MediaKindMetadata::Video(VideoMetadata::default()),
            MediaType::Audio => MediaKindMetadata::Audio(AudioMetadata::default()),
            MediaType::Other => MediaKindMetadata::Other,
        }))
    }
}
