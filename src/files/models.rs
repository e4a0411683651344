use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{models::empty_as_none, views::models::MediaKind};

/// Metadata the API keeps for every uploaded file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub cloud_url: Option<String>,
    #[serde(default)]
    pub cloud_id: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    pub fn media_kind(&self) -> MediaKind {
        match self.file_type.as_deref() {
            Some(t) if t.starts_with("video/") => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

/// Answer of `/upload`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedFile {
    pub file_id: String,
    #[serde(default)]
    pub cloud_url: Option<String>,
}
