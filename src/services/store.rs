//! Document and object store contracts.
//!
//! ## Object paths
//!
//! Uploads are grouped under the owning user and page:
//!
//! ```text
//! {root}/{owner_id}/pages/{page_id}/{hash12}-{file_name}
//! ```
//!
//! `hash12` is the first 12 hex digits of the SHA-256 of the content, so
//! re-uploading the same file under the same name maps to the same object
//! and two different files with the same name do not collide.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("object not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, StoreError>;

    /// Write a whole document. The store assigns `updatedAt`.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        document: serde_json::Value,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path` and return a durable URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError>;

    async fn delete(&self, url: &str) -> Result<(), StoreError>;
}

/// Replace anything outside `[A-Za-z0-9._-]` with `-`.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '-']).is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Storage path for an upload owned by `owner_id` on `page_id`.
pub fn object_path(
    root: &str,
    owner_id: &str,
    page_id: &str,
    file_name: &str,
    bytes: &[u8],
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let hash = format!("{:x}", hasher.finalize());
    format!(
        "{}/{}/pages/{}/{}-{}",
        root.trim_end_matches('/'),
        owner_id,
        page_id,
        &hash[..12],
        sanitize_file_name(file_name)
    )
}
