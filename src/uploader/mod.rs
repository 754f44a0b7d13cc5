//! Batched concurrent uploader -- the core of photo-uploader.
//!
//! Split into focused submodules:
//! - [`batch`] - Upload/batch task structures, batch splitting, commit entries
//! - [`workers`] - Fixed-size worker pool turning items into upload tokens
//! - [`orchestration`] - Per-batch barrier wait, commit, reconciliation, ledger
//!
//! The album helpers in this file only resolve the commit template and then
//! delegate to [`Uploader::add`].

mod batch;
mod orchestration;
mod workers;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;


use std::sync::Arc;

use crate::availability::NetworkGate;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::item::UploadItem;
use crate::photos::PhotosApi;
use crate::types::{AddReport, CommitTemplate};

/// Uploads items to the photo library in pipelined batches
#[derive(Clone)]
pub struct Uploader {
    api: Arc<dyn PhotosApi>,
    config: Arc<Config>,
    gate: NetworkGate,
}

impl Uploader {
    /// Create an uploader; the availability gate follows `config.availability`
    pub fn new(config: Config, api: Arc<dyn PhotosApi>) -> Result<Self> {
        config.validate()?;
        let gate = NetworkGate::from_config(&config.availability);
        Ok(Self {
            api,
            config: Arc::new(config),
            gate,
        })
    }

    /// Replace the availability gate
    pub fn with_gate(mut self, gate: NetworkGate) -> Self {
        self.gate = gate;
        self
    }

    /// Add items to the library without attaching them to an album
    pub async fn add_to_library(&self, items: Vec<UploadItem>) -> Result<AddReport> {
        self.add(items, CommitTemplate::library()).await
    }

    /// Add items to the album titled `title`, creating it if it does not exist
    pub async fn add_to_album(&self, title: &str, items: Vec<UploadItem>) -> Result<AddReport> {
        tracing::info!(title, "finding album");
        let existing = self
            .api
            .find_album_by_title(title)
            .await
            .map_err(|e| Error::Album(format!("could not list albums: {e}")))?;

        let album = match existing {
            Some(album) => album,
            None => {
                tracing::info!(title, "album not found, creating it");
                self.api
                    .create_album(title)
                    .await
                    .map_err(|e| Error::Album(format!("could not create an album: {e}")))?
            }
        };

        self.add(items, CommitTemplate::append_to(album.id)).await
    }

    /// Create a new album titled `title` and add items to it
    pub async fn create_album(&self, title: &str, items: Vec<UploadItem>) -> Result<AddReport> {
        tracing::info!(title, "creating album");
        let album = self
            .api
            .create_album(title)
            .await
            .map_err(|e| Error::Album(format!("could not create an album: {e}")))?;

        self.add(items, CommitTemplate::append_to(album.id)).await
    }
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
