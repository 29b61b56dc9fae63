use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account that owns media assets.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub avatar_s3_key: Option<String>,
    pub created_at: DateTime<Utc>,
}
