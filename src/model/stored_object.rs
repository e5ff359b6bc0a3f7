use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata row for an object written under the storage root. The bytes
/// themselves live on disk at `{storage_root}/{bucket}/{object_key}`.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredObject {
    pub id: u64,
    pub bucket: String,
    pub object_key: String,
    pub file_name: String,
    pub content_type: String,
    pub byte_size: u64,
    pub owner_user_id: u64,
    pub created_at: Option<DateTime<Utc>>,
}
