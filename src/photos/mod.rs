//! Photo library service interface and its HTTP implementation.
//!
//! The orchestrator only talks to the service through [`PhotosApi`], so tests
//! can substitute an in-memory implementation.

mod client;

pub use client::PhotosClient;

use crate::error::Result;
use crate::item::UploadItem;
use crate::types::{Album, BatchCreateRequest, BatchCreateResponse, UploadToken};

/// Operations the uploader needs from the remote photo library
#[async_trait::async_trait]
pub trait PhotosApi: Send + Sync {
    /// Upload one item's raw bytes and return the opaque token for it
    async fn upload_bytes(&self, item: &UploadItem) -> Result<UploadToken>;

    /// Create media items from a batch of tokens
    async fn batch_create_media_items(
        &self,
        request: &BatchCreateRequest,
    ) -> Result<BatchCreateResponse>;

    /// Find an album whose title matches exactly
    async fn find_album_by_title(&self, title: &str) -> Result<Option<Album>>;

    /// Create a new album
    async fn create_album(&self, title: &str) -> Result<Album>;
}
