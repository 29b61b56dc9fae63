use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Media type enum, mirrored by the `media_type_enum` Postgres type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_type_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Other,
}

impl MediaType {
    /// Classify a declared MIME type by its family.
    pub fn from_mime(mime: &str) -> MediaType {
        let family = mime.split('/').next().unwrap_or("");
        match family {
            "image" => MediaType::Image,
            "video" => MediaType::Video,
            "audio" => MediaType::Audio,
            _ => MediaType::Other,
        }
    }

    /// Folder segment used in storage-key layout.
    pub fn key_folder(&self) -> &'static str {
        match self {
            MediaType::Image => "images",
            MediaType::Video => "videos",
            MediaType::Audio => "audio",
            MediaType::Other => "other",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
            MediaType::Other => "other",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored media asset. The row's existence means "ingestion started";
/// kind-specific metadata and derivatives may still be absent.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MediaAsset {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub filename: String,
    pub description: Option<String>,
    pub s3_key: String,
    pub mimetype: String,
    pub size: i64,
    pub is_public: bool,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
    pub upload_at: DateTime<Utc>,
}

/// Per-kind metadata as a tagged union: an asset has exactly one populated
/// variant, matching its classified kind. Storage still uses separate
/// tables; this type enforces the invariant at the domain layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaKindMetadata {
    Image(ImageMetadata),
    Video(VideoMetadata),
    Audio(AudioMetadata),
    Other,
}

impl MediaKindMetadata {
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaKindMetadata::Image(_) => MediaType::Image,
            MediaKindMetadata::Video(_) => MediaType::Video,
            MediaKindMetadata::Audio(_) => MediaType::Audio,
            MediaKindMetadata::Other => MediaType::Other,
        }
    }

    pub fn matches(&self, media_type: MediaType) -> bool {
        self.media_type() == media_type
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct ImageMetadata {
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Bits per pixel of the decoded color model.
    pub color_depth: Option<i32>,
    pub dpi_x: Option<i32>,
    pub dpi_y: Option<i32>,
    /// EXIF tag name -> display value.
    pub exif: Option<JsonValue>,
    pub main_thumbnail_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoMetadata {
    pub duration_seconds: Option<f64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub frame_rate: Option<f64>,
    pub video_codec: Option<String>,
    /// Unset when the source has no audio stream.
    pub audio_codec: Option<String>,
    pub bitrate: Option<i64>,
    pub genre: Option<String>,
    pub main_thumbnail_id: Option<Uuid>,
    pub url_1080: Option<String>,
    pub url_720: Option<String>,
    pub url_480: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct AudioMetadata {
    pub duration_seconds: Option<f64>,
    pub bitrate: Option<i64>,
    pub sample_rate: Option<i32>,
    pub channels: Option<i32>,
    pub genre: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mime_families() {
        assert_eq!(MediaType::from_mime("image/png"), MediaType::Image);
        assert_eq!(MediaType::from_mime("video/mp4"), MediaType::Video);
        assert_eq!(MediaType::from_mime("audio/mpeg"), MediaType::Audio);
        assert_eq!(
            MediaType::from_mime("application/pdf"),
            MediaType::Other
        );
        assert_eq!(MediaType::from_mime(""), MediaType::Other);
    }

    #[test]
    fn test_kind_metadata_matches_classified_type() {
        let meta = MediaKindMetadata::Video(VideoMetadata::default());
        assert!(meta.matches(MediaType::Video));
        assert!(!meta.matches(MediaType::Image));
    }

    #[test]
    fn test_kind_metadata_tagged_serialization() {
        let meta = MediaKindMetadata::Audio(AudioMetadata {
            duration_seconds: Some(12.5),
            channels: Some(2),
            ..Default::default()
        });
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["kind"], "audio");
        assert_eq!(json["channels"], 2);
    }
}
