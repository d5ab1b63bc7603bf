//! Inspiration photos attached to regular orders.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use pandi_dorty_core::{OrderId, PhotoId};

/// Largest accepted photo, in bytes.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for photos.
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoError {
    #[error("{name}: nepodporovaný formát ({mime_type})")]
    UnsupportedType { name: String, mime_type: String },
    #[error("{name}: soubor je větší než 10 MB")]
    TooLarge { name: String },
}

/// A validated photo waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    original_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl NewPhoto {
    /// Validate an uploaded file. Empty uploads yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `PhotoError` for a disallowed MIME type or an oversized file.
    pub fn from_upload(
        original_name: Option<&str>,
        mime_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Option<Self>, PhotoError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        let name = original_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("photo")
            .to_owned();
        let mime_type = mime_type.unwrap_or_default().to_ascii_lowercase();

        if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(PhotoError::UnsupportedType { name, mime_type });
        }
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(PhotoError::TooLarge { name });
        }

        Ok(Some(Self {
            original_name: name,
            mime_type,
            bytes,
        }))
    }

    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Photo metadata, listed with orders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMeta {
    pub id: PhotoId,
    pub order_id: OrderId,
    pub original_name: String,
    pub mime_type: String,
    pub file_size: i32,
    pub uploaded_at: DateTime<Utc>,
}

/// A stored photo with its decoded bytes.
#[derive(Debug, Clone)]
pub struct Photo {
    pub meta: PhotoMeta,
    pub bytes: Vec<u8>,
}
