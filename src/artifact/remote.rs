/// HTTP artifact host backend
///
/// Performs signed multipart uploads to a Cloudinary-style upload endpoint.
use crate::{
    artifact::ArtifactBackend,
    config::ArtifactStoreConfig,
    error::{ApiError, ApiResult},
};
use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

/// Upload timeout. Issuance is never blocked indefinitely on the host.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP upload backend
pub struct HttpArtifactBackend {
    client: reqwest::Client,
    config: ArtifactStoreConfig,
}

impl HttpArtifactBackend {
    pub fn new(config: ArtifactStoreConfig) -> Self {
        info!(
            "Initializing artifact store (cloud: {})",
            config.cloud_name
        );

        let client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    /// Upload endpoint for this cloud
    fn upload_url(&self) -> String {
        match &self.config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://api.cloudinary.com/v1_1/{}/raw/upload",
                self.config.cloud_name
            ),
        }
    }

    /// Request signature: SHA-256 over the signed params plus the API secret
    fn sign(&self, public_id: &str, timestamp: i64) -> String {
        let payload = format!(
            "public_id={}&timestamp={}{}",
            public_id, timestamp, self.config.api_secret
        );

        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl ArtifactBackend for HttpArtifactBackend {
    async fn upload(
        &self,
        public_id: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ApiResult<String> {
        let timestamp = Utc::now().timestamp();
        let signature = self.sign(public_id, timestamp);

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(format!("{}.svg", public_id))
            .mime_str(content_type)
            .map_err(|e| ApiError::ArtifactStorage(format!("Invalid content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp.to_string())
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);

        debug!("Uploading artifact {} to {}", public_id, self.upload_url());

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::ArtifactStorage(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::ArtifactStorage(format!(
                "Upload rejected with status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::ArtifactStorage(format!("Invalid upload response: {}", e)))?;

        body.get("secure_url")
            .or_else(|| body.get("url"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ApiError::ArtifactStorage("Upload response missing hosted URL".to_string())
            })
    }
}
