//! Core types for photo-uploader
//!
//! Request and response shapes follow the photo library's JSON wire format
//! (camelCase field names) so the same types serve both the orchestrator and
//! the HTTP client.

use serde::{Deserialize, Serialize};

use crate::error::AddError;

/// Opaque token returned by a successful byte upload
///
/// The empty token is the "no token" sentinel: the upload failed and the item
/// must not be part of any batch commit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadToken(pub String);

impl UploadToken {
    /// Create a new UploadToken
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The "no token" sentinel
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Whether this is the "no token" sentinel
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for UploadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an album in the remote library
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(pub String);

impl std::fmt::Display for AlbumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An album in the remote library
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Album identifier
    pub id: AlbumId,
    /// Album title
    #[serde(default)]
    pub title: String,
    /// Link to the album in the web UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
}

/// A media item created by a batch commit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Media item identifier
    pub id: String,
    /// Description attached at creation time
    #[serde(default)]
    pub description: String,
    /// Original file name
    #[serde(default)]
    pub filename: String,
    /// Link to the item in the web UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
}

/// Where new items are placed inside the target album
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPosition {
    /// Placement strategy
    pub position: PositionType,
}

impl AlbumPosition {
    /// Append to the end of the album
    pub fn last_in_album() -> Self {
        Self {
            position: PositionType::LastInAlbum,
        }
    }
}

/// Album placement strategies understood by the service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionType {
    /// Insert before every existing item
    FirstInAlbum,
    /// Append after every existing item
    LastInAlbum,
}

/// Album attachment fields merged into every batch commit of a run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitTemplate {
    /// Target album (None = library only)
    pub album_id: Option<AlbumId>,
    /// Placement inside the album
    pub album_position: Option<AlbumPosition>,
}

impl CommitTemplate {
    /// Template for adding items to the library without an album
    pub fn library() -> Self {
        Self::default()
    }

    /// Template appending items to the end of `album_id`
    pub fn append_to(album_id: AlbumId) -> Self {
        Self {
            album_id: Some(album_id),
            album_position: Some(AlbumPosition::last_in_album()),
        }
    }

    /// Build a request for one batch from this template
    pub fn request(&self, new_media_items: Vec<NewMediaItem>) -> BatchCreateRequest {
        BatchCreateRequest {
            album_id: self.album_id.clone(),
            album_position: self.album_position,
            new_media_items,
        }
    }
}

/// Reference to uploaded bytes inside a commit request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMediaItem {
    /// Token from the byte upload
    pub upload_token: UploadToken,
}

/// One entry of a batch commit request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaItem {
    /// Description shown in the library (the item's display name)
    pub description: String,
    /// Uploaded bytes reference
    pub simple_media_item: SimpleMediaItem,
}

impl NewMediaItem {
    /// Entry keyed by `token` with `description`
    pub fn new(token: UploadToken, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            simple_media_item: SimpleMediaItem {
                upload_token: token,
            },
        }
    }
}

/// Batch commit request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateRequest {
    /// Target album
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<AlbumId>,
    /// Placement inside the album
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_position: Option<AlbumPosition>,
    /// Items to create
    pub new_media_items: Vec<NewMediaItem>,
}

/// Status reported per token by a batch commit (code 0 = success)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Status code
    #[serde(default)]
    pub code: i32,
    /// Human-readable status message
    #[serde(default)]
    pub message: String,
}

impl Status {
    /// Whether the status is the success sentinel
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Per-token outcome of a batch commit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaItemResult {
    /// Token this result refers to
    pub upload_token: UploadToken,
    /// Outcome status
    #[serde(default)]
    pub status: Status,
    /// Created item (present on success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_item: Option<MediaItem>,
}

/// Batch commit response
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateResponse {
    /// One entry per committed token
    #[serde(default)]
    pub new_media_item_results: Vec<NewMediaItemResult>,
}

/// Externally visible outcome for one input item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddResult {
    /// Created media item (present on success)
    pub media_item: Option<MediaItem>,
    /// Failure (present on failure)
    pub error: Option<AddError>,
}

impl AddResult {
    /// Successful outcome
    pub fn ok(media_item: Option<MediaItem>) -> Self {
        Self {
            media_item,
            error: None,
        }
    }

    /// Failed outcome
    pub fn failed(error: AddError) -> Self {
        Self {
            media_item: None,
            error: Some(error),
        }
    }

    /// Whether the item was added
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of one orchestrator run
#[derive(Debug, Default)]
pub struct AddReport {
    /// One result per input item, in input order
    pub results: Vec<AddResult>,
    /// First ledger append failure, if any
    pub ledger_error: Option<crate::error::Error>,
    /// Successfully committed identifiers that could not be written to the ledger
    pub unrecorded: Vec<String>,
}

impl AddReport {
    /// Number of items that were added
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// Number of items that failed
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// One `#<n>: <identifier>: OK` or `#<n>: <identifier>: <error>` line per
    /// result, numbered from 1
    ///
    /// `identifiers` must be in the same order as the items passed to the run.
    pub fn result_lines(&self, identifiers: &[String]) -> Vec<String> {
        identifiers
            .iter()
            .zip(&self.results)
            .enumerate()
            .map(|(i, (identifier, result))| match &result.error {
                Some(e) => format!("#{}: {}: {}", i + 1, identifier, e),
                None => format!("#{}: {}: OK", i + 1, identifier),
            })
            .collect()
    }
}
