//! Utility functions for path handling and argument parsing

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Expand a leading `~` to the current user's home directory
///
/// Paths without a leading `~` are returned unchanged. `~user` forms are not
/// supported and are returned unchanged as well.
///
/// # Examples
///
/// ```
/// use photo_uploader::utils::expand_home;
/// use std::path::Path;
///
/// let absolute = expand_home(Path::new("/var/lib/done.txt")).unwrap();
/// assert_eq!(absolute, Path::new("/var/lib/done.txt"));
/// ```
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or_else(|| Error::Config {
        message: format!("cannot expand {}: home directory unknown", path.display()),
        key: Some("ledger.path".to_string()),
    })?;
    Ok(home.join(rest))
}

/// Whether the file's extension is in the exclusion list
///
/// Extensions are compared with their leading dot and case-sensitively, so
/// `.MOV` excludes `clip.MOV` but not `clip.mov`.
pub fn has_excluded_extension(path: &Path, excluded: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    excluded
        .iter()
        .any(|candidate| candidate.strip_prefix('.').unwrap_or(candidate) == ext)
}

/// Split a `user:password` credential on the first colon
pub fn parse_basic_auth(value: &str) -> Result<(String, String)> {
    match value.split_once(':') {
        Some((user, password)) => Ok((user.to_string(), password.to_string())),
        None => Err(Error::Discovery(format!(
            "basic auth must be user:password, got {value:?}"
        ))),
    }
}

/// Split a `Name: value` header on the first colon, trimming both halves
pub fn parse_header(value: &str) -> Result<(String, String)> {
    match value.split_once(':') {
        Some((name, val)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), val.trim().to_string()))
        }
        _ => Err(Error::Discovery(format!(
            "header must be Name: value, got {value:?}"
        ))),
    }
}

/// Last non-empty path segment of a URL, or the whole URL when there is none
pub fn url_file_name(url: &url::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(|s| s.to_string())
        .unwrap_or_else(|| url.to_string())
}
