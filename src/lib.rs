//! # photo-uploader
//!
//! Batched, concurrent uploader for a remote photo library.
//!
//! ## Design Philosophy
//!
//! photo-uploader is designed to be:
//! - **Resumable** - Every committed item is appended to a completion ledger,
//!   and later runs skip what the ledger already lists
//! - **Pipelined** - A fixed pool of workers uploads bytes while earlier
//!   batches are being committed
//! - **Failure-isolating** - One bad file or one rejected batch never stops
//!   the rest of the run
//! - **Polite** - Uploads can be confined to a daily hour window
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use photo_uploader::{Config, PhotosClient, UploadItem, Uploader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.api.access_token = Some("ya29.token".to_string());
//!
//!     let client = PhotosClient::new(&config.api, reqwest::Client::new())?;
//!     let uploader = Uploader::new(config, Arc::new(client))?;
//!
//!     let report = uploader
//!         .add_to_album("Holidays", vec![UploadItem::file("/photos/beach.jpg")])
//!         .await?;
//!     for (i, result) in report.results.iter().enumerate() {
//!         match &result.error {
//!             None => println!("#{}: OK", i + 1),
//!             Some(e) => println!("#{}: {}", i + 1, e),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Daily upload window
pub mod availability;
/// Configuration types
pub mod config;
/// Turning paths and URLs into upload items
pub mod discovery;
/// Error types
pub mod error;
/// Upload sources (local files and HTTP URLs)
pub mod item;
/// Completion ledger
pub mod ledger;
/// Remote photo library client
pub mod photos;
/// Core types and wire formats
pub mod types;
/// Batched concurrent uploader (decomposed into focused submodules)
pub mod uploader;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use availability::{Clock, HourWindow, NetworkGate, SystemClock};
pub use config::Config;
pub use discovery::{DiscoveryOptions, find_upload_items};
pub use error::{AddError, Error, Result};
pub use item::UploadItem;
pub use ledger::{Ledger, LedgerWriter};
pub use photos::{PhotosApi, PhotosClient};
pub use types::{AddReport, AddResult, Album, AlbumId, CommitTemplate, MediaItem, UploadToken};
pub use uploader::Uploader;
