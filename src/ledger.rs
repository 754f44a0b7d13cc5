//! Completion ledger -- the persisted set of identifiers committed in past runs.
//!
//! The ledger is a text file with one identifier per line. Lines are raw bytes
//! (file paths are stored exactly as the OS spells them, UTF-8 or not). It is
//! only ever appended to; duplicate lines are harmless because readers treat
//! the file as a set.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{Error, Result};

/// Identifiers loaded from the ledger file
///
/// Each identifier maps to the line number it was last seen on. The number is
/// informational only.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    entries: HashMap<Vec<u8>, u64>,
}

impl Ledger {
    /// Read every line of the ledger at `path`
    ///
    /// A missing file is an error: the ledger must exist before discovery
    /// runs. Use [`Ledger::ensure_exists`] to create an empty one.
    pub async fn load(path: &Path) -> Result<Self> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::ledger(path, e))?;

        let mut entries = HashMap::new();
        let mut lines = BufReader::new(file).split(b'\n');
        let mut seq = 0u64;
        while let Some(mut line) = lines
            .next_segment()
            .await
            .map_err(|e| Error::ledger(path, e))?
        {
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }
            entries.insert(line, seq);
            seq += 1;
        }

        tracing::debug!(path = %path.display(), entries = entries.len(), "loaded completion ledger");
        Ok(Self { entries })
    }

    /// Create an empty ledger file if none exists yet
    pub async fn ensure_exists(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::ledger(path, e))?;
        }
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| Error::ledger(path, e))?;
        Ok(())
    }

    /// Whether `key` was committed in a past run
    pub fn contains(&self, key: impl AsRef<[u8]>) -> bool {
        self.entries.contains_key(key.as_ref())
    }

    /// Sequence number recorded for `key`
    pub fn sequence(&self, key: impl AsRef<[u8]>) -> Option<u64> {
        self.entries.get(key.as_ref()).copied()
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append handle held for the duration of a commit phase
///
/// The file is closed when the writer is dropped, on every exit path.
#[derive(Debug)]
pub struct LedgerWriter {
    path: PathBuf,
    file: tokio::fs::File,
}

impl LedgerWriter {
    /// Open the ledger for appending, creating it if needed
    pub async fn open(path: &Path) -> Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| Error::ledger(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Append one key as a line and flush it to disk
    pub async fn append(&mut self, key: impl AsRef<[u8]>) -> Result<()> {
        let key = key.as_ref();
        let mut line = Vec::with_capacity(key.len() + 1);
        line.extend_from_slice(key);
        line.push(b'\n');
        self.file
            .write_all(&line)
            .await
            .map_err(|e| Error::ledger(&self.path, e))?;
        self.file
            .flush()
            .await
            .map_err(|e| Error::ledger(&self.path, e))?;
        Ok(())
    }

    /// Path of the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
