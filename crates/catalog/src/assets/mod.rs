//! Asset storage.
//!
//! Thumbnails are uploaded to a bucketed object store before the widget row
//! is written; readers only ever see the public URL recorded on the row.

mod memory;
mod rest;

pub use memory::MemoryAssetStore;
pub use rest::RestAssetStore;

use async_trait::async_trait;
use thiserror::Error;

/// A stored object: its bucket-relative path and public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub path: String,
    pub public_url: String,
}

#[derive(Debug, Error)]
pub enum AssetStoreError {
    #[error("asset request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("asset store rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("asset store unavailable: {0}")]
    Unavailable(String),
}

/// Write-side port for binary assets.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `bytes` at `path`, returning a reference to the stored object.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<AssetRef, AssetStoreError>;

    /// Public URL for the object at `path`.
    fn public_url(&self, path: &str) -> String;
}
