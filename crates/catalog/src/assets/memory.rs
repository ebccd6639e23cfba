//! In-memory asset store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use super::{AssetRef, AssetStore, AssetStoreError};

struct StoredAsset {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory [`AssetStore`] with scripted upload failures.
#[derive(Default)]
pub struct MemoryAssetStore {
    objects: RwLock<HashMap<String, StoredAsset>>,
    scripted_failures: Mutex<usize>,
}

impl MemoryAssetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next upload to fail. Each call queues one failure.
    pub fn fail_next_upload(&self) {
        *self
            .scripted_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
    }

    /// Whether an object exists at `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    /// Number of stored objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Size in bytes of the object at `path`, if present.
    #[must_use]
    pub fn object_size(&self, path: &str) -> Option<usize> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .map(|object| object.bytes.len())
    }

    /// Content type recorded for the object at `path`, if present.
    #[must_use]
    pub fn content_type_of(&self, path: &str) -> Option<String> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .map(|object| object.content_type.clone())
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<AssetRef, AssetStoreError> {
        {
            let mut failures = self
                .scripted_failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *failures > 0 {
                *failures -= 1;
                return Err(AssetStoreError::Unavailable(
                    "scripted upload failure".to_string(),
                ));
            }
        }

        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                path.to_string(),
                StoredAsset {
                    bytes,
                    content_type: content_type.to_string(),
                },
            );

        Ok(AssetRef {
            path: path.to_string(),
            public_url: self.public_url(path),
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://assets/{path}")
    }
}
