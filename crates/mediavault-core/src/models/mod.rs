pub mod media;
pub mod tag;
pub mod thumbnail;
pub mod user;

pub use media::{
    AudioMetadata, ImageMetadata, MediaAsset, MediaKindMetadata, MediaType, VideoMetadata,
};
pub use tag::{parse_tag_list, Tag};
pub use thumbnail::{pick_display_thumbnail, Thumbnail, PURPOSE_LISTING};
pub use user::User;
