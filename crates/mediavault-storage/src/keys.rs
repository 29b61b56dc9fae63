//! Storage-key layout.
//!
//! Originals:   `{owner_id}/{kind}/{timestamp}_{random}_{sanitized_name}`
//! Thumbnails:  `{owner_id}/{kind}/thumbnails/{media_id}_{purpose}.{ext}`
//! Renditions:  `{owner_id}/videos/renditions/{media_id}_{height}p.mp4`
//!
//! The timestamp plus random disambiguator make original keys practically
//! globally unique without an existence pre-check.

use chrono::Utc;
use mediavault_core::models::MediaType;
use uuid::Uuid;

/// Key for an original payload. `name` must already be sanitized.
pub fn original_key(owner_id: Uuid, media_type: MediaType, name: &str) -> String {
    let timestamp = Utc::now().timestamp();
    let random: u32 = rand::random();
    format!(
        "{}/{}/{}_{:08x}_{}",
        owner_id,
        media_type.key_folder(),
        timestamp,
        random,
        name
    )
}

/// Key for a derived thumbnail, unique per (asset, purpose).
pub fn thumbnail_key(
    owner_id: Uuid,
    media_type: MediaType,
    media_id: Uuid,
    purpose: &str,
    ext: &str,
) -> String {
    format!(
        "{}/{}/thumbnails/{}_{}.{}",
        owner_id,
        media_type.key_folder(),
        media_id,
        purpose,
        ext
    )
}

/// Key for a scaled video rendition at the given target height.
pub fn rendition_key(owner_id: Uuid, media_id: Uuid, height: u32) -> String {
    format!(
        "{}/videos/renditions/{}_{}p.mp4",
        owner_id, media_id, height
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_key_layout() {
        let owner = Uuid::new_v4();
        let key = original_key(owner, MediaType::Image, "photo.jpg");
        let prefix = format!("{}/images/", owner);
        assert!(key.starts_with(&prefix));
        assert!(key.ends_with("_photo.jpg"));

        // timestamp and random segments between prefix and name
        let rest = &key[prefix.len()..];
        let parts: Vec<&str> = rest.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2], "photo.jpg");
    }

    #[test]
    fn test_original_keys_disambiguated() {
        let owner = Uuid::new_v4();
        let a = original_key(owner, MediaType::Video, "clip.mp4");
        let b = original_key(owner, MediaType::Video, "clip.mp4");
        assert_ne!(a, b);
    }

    #[test]
    fn test_thumbnail_key_layout() {
        let owner = Uuid::new_v4();
        let media = Uuid::new_v4();
        let key = thumbnail_key(owner, MediaType::Video, media, "listing", "jpg");
        assert_eq!(
            key,
            format!("{}/videos/thumbnails/{}_listing.jpg", owner, media)
        );
    }

    #[test]
    fn test_rendition_key_layout() {
        let owner = Uuid::new_v4();
        let media = Uuid::new_v4();
        let key = rendition_key(owner, media, 720);
        assert_eq!(
            key,
            format!("{}/videos/renditions/{}_720p.mp4", owner, media)
        );
    }
}
