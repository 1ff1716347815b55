//! Uploaded media. Blobs are opaque; records keep only the generated key.

#[cfg(test)]
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;

pub use s3::S3MediaStore;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("upload of '{key}' failed: {message}")]
    Upload { key: String, message: String },

    #[error("delete of '{key}' failed: {message}")]
    Delete { key: String, message: String },
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Per-entity key prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPrefix {
    Projects,
    Books,
    Photos,
    SkillIcons,
}

impl MediaPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaPrefix::Projects => "projects/",
            MediaPrefix::Books => "books/",
            MediaPrefix::Photos => "photos/",
            MediaPrefix::SkillIcons => "skills/icons/",
        }
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), MediaError>;
    async fn delete(&self, key: &str) -> Result<(), MediaError>;
}

/// Generates a fresh key under `prefix`, keeping a sanitized extension from
/// the client's filename.
pub fn generate_key(prefix: MediaPrefix, filename: Option<&str>) -> String {
    let ext = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    match ext {
        Some(ext) => format!("{}{}.{}", prefix.as_str(), Uuid::new_v4(), ext),
        None => format!("{}{}", prefix.as_str(), Uuid::new_v4()),
    }
}

/// Turns stored keys into public URLs.
#[derive(Debug, Clone)]
pub struct MediaUrls {
    base_url: String,
}

impl MediaUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        Some(format!("{}/{}", self.base_url, key.trim_start_matches('/')))
    }
}
