//! Object store collaborator
//!
//! The pipeline only needs download/upload; retry and backoff stay with the
//! storage side. `HttpBlobStore` is the concrete client used by the worker.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::{AppError, Result};

/// Storage read/write capability consumed by the pipeline
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch a blob's bytes
    async fn download(&self, container: &str, key: &str) -> Result<Bytes>;

    /// Write a blob with a content-type header
    async fn upload(&self, container: &str, key: &str, data: Bytes, content_type: &str)
        -> Result<()>;
}

/// HTTP client for a blob store addressing `{endpoint}/{container}/{key}`,
/// with an optional access-token query string
pub struct HttpBlobStore {
    endpoint: String,
    access_token: Option<String>,
    http_client: Client,
}

impl HttpBlobStore {
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| AppError::Storage(format!("failed to create HTTP client: {e}")))?;

        info!(endpoint = %endpoint, "blob store client initialized");

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
            http_client,
        })
    }

    fn object_url(&self, container: &str, key: &str) -> String {
        let mut url = format!("{}/{}/{}", self.endpoint, container, key);
        if let Some(ref token) = self.access_token {
            url.push('?');
            url.push_str(token);
        }
        url
    }
}

#[async_trait]
impl ObjectStore for HttpBlobStore {
    async fn download(&self, container: &str, key: &str) -> Result<Bytes> {
        debug!(container, key, "downloading blob");

        let response = self
            .http_client
            .get(self.object_url(container, key))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("download failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "download of {container}/{key} failed with status {status}: {body}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Storage(format!("failed to read download body: {e}")))?;

        debug!(container, key, size = bytes.len(), "downloaded blob");
        Ok(bytes)
    }

    async fn upload(
        &self,
        container: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()> {
        debug!(container, key, size = data.len(), "uploading blob");

        let response = self
            .http_client
            .put(self.object_url(container, key))
            .header("Content-Type", content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "upload of {container}/{key} failed with status {status}: {body}"
            )));
        }

        info!(container, key, "uploaded blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_joins_segments() {
        let store = HttpBlobStore::new("https://blobs.example.net/", None).unwrap();
        assert_eq!(
            store.object_url("thumbnails", "photo-thumbnail-100.png"),
            "https://blobs.example.net/thumbnails/photo-thumbnail-100.png"
        );
    }

    #[test]
    fn test_object_url_appends_access_token() {
        let store =
            HttpBlobStore::new("https://blobs.example.net", Some("sig=abc".to_string())).unwrap();
        assert_eq!(
            store.object_url("thumbnails", "a.png"),
            "https://blobs.example.net/thumbnails/a.png?sig=abc"
        );
    }
}
