//! REST asset store.
//!
//! Uploads post the raw body to `{base}/{bucket}/{path}`. Public URLs are
//! built from a separate public base so uploads can go to the origin while
//! reads come off a CDN.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::AssetConfig;

use super::{AssetRef, AssetStore, AssetStoreError};

/// Client for the hosted object store.
#[derive(Clone)]
pub struct RestAssetStore {
    inner: Arc<RestAssetStoreInner>,
}

struct RestAssetStoreInner {
    client: reqwest::Client,
    upload_base: String,
    public_base: String,
    bucket: String,
    service_key: String,
}

impl RestAssetStore {
    /// Create a new asset store client.
    #[must_use]
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            inner: Arc::new(RestAssetStoreInner {
                client: reqwest::Client::new(),
                upload_base: config.base_url.as_str().trim_end_matches('/').to_string(),
                public_base: config
                    .public_base_url
                    .as_str()
                    .trim_end_matches('/')
                    .to_string(),
                bucket: config.bucket.clone(),
                service_key: config.service_key.expose_secret().to_string(),
            }),
        }
    }
}

#[async_trait]
impl AssetStore for RestAssetStore {
    #[instrument(skip(self, bytes), fields(path = %path, size = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<AssetRef, AssetStoreError> {
        let url = object_url(&self.inner.upload_base, &self.inner.bucket, path);
        let response = self
            .inner
            .client
            .post(&url)
            .header("apikey", &self.inner.service_key)
            .bearer_auth(&self.inner.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AssetStoreError::Rejected {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        Ok(AssetRef {
            path: path.to_string(),
            public_url: self.public_url(path),
        })
    }

    fn public_url(&self, path: &str) -> String {
        object_url(&self.inner.public_base, &self.inner.bucket, path)
    }
}

fn object_url(base: &str, bucket: &str, path: &str) -> String {
    format!("{base}/{bucket}/{path}")
}
