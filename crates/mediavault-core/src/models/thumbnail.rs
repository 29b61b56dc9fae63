use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purpose tag for the thumbnail preferred in listing views.
pub const PURPOSE_LISTING: &str = "listing";

/// A derived still image owned by one media asset. An asset may carry
/// zero, one, or many thumbnails distinguished by `purpose`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thumbnail {
    pub id: Uuid,
    pub media_id: Uuid,
    pub s3_key: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub size: Option<i64>,
    pub purpose: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Pick the thumbnail to display: the "listing" one when present,
/// otherwise the most recently created of any purpose.
pub fn pick_display_thumbnail(thumbnails: &[Thumbnail]) -> Option<&Thumbnail> {
    thumbnails
        .iter()
        .find(|t| t.purpose.as_deref() == Some(PURPOSE_LISTING))
        .or_else(|| thumbnails.iter().max_by_key(|t| t.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn thumb(purpose: Option<&str>, created_secs: i64) -> Thumbnail {
        Thumbnail {
            id: Uuid::new_v4(),
            media_id: Uuid::new_v4(),
            s3_key: format!("k/{}", created_secs),
            width: Some(320),
            height: Some(240),
            size: Some(1000),
            purpose: purpose.map(String::from),
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_listing_purpose_preferred() {
        let thumbs = vec![thumb(Some("preview"), 100), thumb(Some("listing"), 50)];
        let picked = pick_display_thumbnail(&thumbs).unwrap();
        assert_eq!(picked.purpose.as_deref(), Some("listing"));
    }

    #[test]
    fn test_fallback_to_most_recent() {
        let thumbs = vec![thumb(Some("preview"), 100), thumb(None, 200)];
        let picked = pick_display_thumbnail(&thumbs).unwrap();
        assert_eq!(picked.created_at.timestamp(), 200);
    }

    #[test]
    fn test_empty_yields_none() {
        assert!(pick_display_thumbnail(&[]).is_none());
    }
}
