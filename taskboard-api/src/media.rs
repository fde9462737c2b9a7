/// Media host boundary
///
/// Given an image buffer and a user ID, the media host returns a stable
/// public URL for a transformed (300×300 fill-cropped) avatar. All
/// failures propagate as a generic upload error.
///
/// The production implementation posts an unsigned multipart upload to
/// a Cloudinary-style endpoint. When no media configuration is present,
/// [`NoopMediaStore`] rejects uploads.

use crate::config::MediaConfig;
use async_trait::async_trait;
use serde::Deserialize;

/// Transformation applied server-side by the media host
const AVATAR_TRANSFORMATION: &str = "w_300,h_300,c_fill,g_face";

/// Error type for media uploads
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Transport-level failure talking to the media host
    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Media host rejected the upload
    #[error("Media host rejected the upload with status {0}")]
    Rejected(u16),

    /// No media host is configured
    #[error("Media uploads are not configured")]
    NotConfigured,
}

/// Boundary for storing avatar images
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads an avatar for a user, returning its public URL
    async fn upload_avatar(&self, user_id: i64, bytes: Vec<u8>) -> Result<String, MediaError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Media store backed by an HTTP upload endpoint
pub struct HttpMediaStore {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl HttpMediaStore {
    /// Creates a media store from media configuration
    pub fn new(config: MediaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: config.upload_url,
            upload_preset: config.upload_preset,
        }
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload_avatar(&self, user_id: i64, bytes: Vec<u8>) -> Result<String, MediaError> {
        let file = reqwest::multipart::Part::bytes(bytes).file_name(format!("user_{}", user_id));

        // Uploading under a fixed public id overwrites the previous avatar.
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", "taskboard/profiles")
            .text("public_id", format!("user_{}", user_id))
            .text("transformation", AVATAR_TRANSFORMATION);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MediaError::Rejected(response.status().as_u16()));
        }

        let upload: UploadResponse = response.json().await?;
        Ok(upload.secure_url)
    }
}

/// Media store used when no media host is configured
pub struct NoopMediaStore;

#[async_trait]
impl MediaStore for NoopMediaStore {
    async fn upload_avatar(&self, _user_id: i64, _bytes: Vec<u8>) -> Result<String, MediaError> {
        Err(MediaError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_store_rejects_uploads() {
        let store = NoopMediaStore;
        let result = store.upload_avatar(1, vec![0xFF, 0xD8]).await;
        assert!(matches!(result, Err(MediaError::NotConfigured)));
    }

    #[test]
    fn test_avatar_transformation_is_fill_crop() {
        assert!(AVATAR_TRANSFORMATION.contains("w_300"));
        assert!(AVATAR_TRANSFORMATION.contains("h_300"));
        assert!(AVATAR_TRANSFORMATION.contains("c_fill"));
    }
}
