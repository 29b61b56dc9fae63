//! Object storage gateway.
//!
//! The ingestion pipeline's only durability mechanism for binary payloads.
//! Keys follow the layout in [`keys`]; backends implement [`Storage`].

pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
