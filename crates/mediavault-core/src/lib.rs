//! Core domain types shared across the mediavault workspace.

pub mod config;
pub mod error;
pub mod models;
pub mod sanitize;

pub use config::Config;
pub use error::AppError;
pub use sanitize::sanitize_filename;
