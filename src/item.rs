//! Upload item sources -- local files and HTTP-fetched URLs.
//!
//! Every item exposes the same capability set: a stable identifier (used for
//! the completion ledger and logging), a display name (used as the media item
//! description), and a byte stream opened on demand by an upload worker.

use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::header::{HeaderName, HeaderValue};

use crate::error::{Error, Result};

/// Byte stream produced by an item
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + Sync>>;

/// A source of bytes to upload
#[derive(Clone, Debug)]
pub enum UploadItem {
    /// Local file
    File(FileUploadItem),
    /// Resource fetched over HTTP(S)
    Http(HttpUploadItem),
}

impl UploadItem {
    /// Local file item
    pub fn file(path: impl Into<PathBuf>) -> Self {
        UploadItem::File(FileUploadItem::new(path))
    }

    /// Printable identifier: the file path or the request URL
    ///
    /// Non-UTF-8 bytes in a path are replaced, so this is for display only.
    /// Ledger membership uses [`UploadItem::ledger_key`].
    pub fn identifier(&self) -> String {
        match self {
            UploadItem::File(f) => f.path().display().to_string(),
            UploadItem::Http(h) => h.url().to_string(),
        }
    }

    /// Exact bytes recorded in the completion ledger for this item
    ///
    /// For files this is the path as the OS stores it, so two distinct
    /// non-UTF-8 names never share a key.
    pub fn ledger_key(&self) -> Vec<u8> {
        match self {
            UploadItem::File(f) => f.path().as_os_str().as_encoded_bytes().to_vec(),
            UploadItem::Http(h) => h.url().as_str().as_bytes().to_vec(),
        }
    }

    /// Display name used as the media item description
    pub fn name(&self) -> String {
        match self {
            UploadItem::File(f) => f.name(),
            UploadItem::Http(h) => crate::utils::url_file_name(&h.url),
        }
    }

    /// Open the item's content as a stream of bytes
    pub async fn open(&self) -> Result<ByteStream> {
        match self {
            UploadItem::File(f) => f.open().await,
            UploadItem::Http(h) => h.open().await,
        }
    }
}

impl fmt::Display for UploadItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

/// A file on the local filesystem
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUploadItem {
    path: PathBuf,
}

impl FileUploadItem {
    /// Wrap a file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    async fn open(&self) -> Result<ByteStream> {
        let file = tokio::fs::File::open(&self.path).await?;
        Ok(Box::pin(tokio_util::io::ReaderStream::new(file)))
    }
}

/// A resource fetched with a GET request
#[derive(Clone, Debug)]
pub struct HttpUploadItem {
    client: reqwest::Client,
    url: url::Url,
    basic_auth: Option<(String, String)>,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl HttpUploadItem {
    /// Build an item for `url`; headers are validated here so that a bad
    /// header surfaces during discovery, before any upload starts.
    pub fn new(
        client: reqwest::Client,
        url: url::Url,
        basic_auth: Option<(String, String)>,
        headers: &[(String, String)],
    ) -> Result<Self> {
        let headers = headers
            .iter()
            .map(|(name, value)| {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| Error::Discovery(format!("invalid header name {name:?}: {e}")))?;
                let value = HeaderValue::from_str(value).map_err(|e| {
                    Error::Discovery(format!("invalid value for header {name}: {e}"))
                })?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            client,
            url,
            basic_auth,
            headers,
        })
    }

    /// The request URL
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    async fn open(&self) -> Result<ByteStream> {
        let mut request = self.client.get(self.url.clone());
        if let Some((user, password)) = &self.basic_auth {
            request = request.basic_auth(user, Some(password));
        }
        for (name, value) in &self.headers {
            request = request.header(name.clone(), value.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("GET {} failed", self.url),
            });
        }

        Ok(Box::pin(
            response.bytes_stream().map_err(std::io::Error::other),
        ))
    }
}
