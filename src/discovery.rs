//! Turn command-line arguments into upload items.
//!
//! An argument is either an `http(s)://` URL, which becomes a single HTTP
//! item, or a filesystem path that is walked recursively. Files whose
//! ledger key is already in the completion ledger are skipped.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::item::{HttpUploadItem, UploadItem};
use crate::ledger::Ledger;
use crate::utils::{has_excluded_extension, parse_basic_auth, parse_header};

/// How arguments are expanded into upload items
#[derive(Clone, Debug, Default)]
pub struct DiscoveryOptions {
    /// Extensions (with leading dot, case-sensitive) skipped during the walk
    pub excluded_extensions: Vec<String>,
    /// Credentials sent with every URL item request
    pub basic_auth: Option<(String, String)>,
    /// Extra headers sent with every URL item request
    pub headers: Vec<(String, String)>,
    /// Client used to fetch URL items
    pub client: reqwest::Client,
}

impl DiscoveryOptions {
    /// Options with the given exclusion list and no request customization
    pub fn new(client: reqwest::Client, excluded_extensions: Vec<String>) -> Self {
        Self {
            excluded_extensions,
            basic_auth: None,
            headers: Vec::new(),
            client,
        }
    }

    /// Set basic auth from a `user:password` string
    pub fn with_basic_auth(mut self, value: &str) -> Result<Self> {
        self.basic_auth = Some(parse_basic_auth(value)?);
        Ok(self)
    }

    /// Add a request header from a `Name: value` string
    pub fn with_header(mut self, value: &str) -> Result<Self> {
        self.headers.push(parse_header(value)?);
        Ok(self)
    }
}

/// Expand `args` into upload items in argument order.
///
/// Fails with [`Error::NothingToUpload`] when there are no arguments or when
/// every candidate was excluded or already recorded in `ledger`.
pub fn find_upload_items(
    args: &[String],
    options: &DiscoveryOptions,
    ledger: &Ledger,
) -> Result<Vec<UploadItem>> {
    if args.is_empty() {
        return Err(Error::NothingToUpload(String::new()));
    }

    let mut items = Vec::new();
    for arg in args {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            items.push(url_item(arg, options)?);
        } else {
            walk(Path::new(arg), options, ledger, &mut items)?;
        }
    }

    if items.is_empty() {
        return Err(Error::NothingToUpload(format!(" in {}", args.join(", "))));
    }
    tracing::info!(items = items.len(), "discovered upload items");
    Ok(items)
}

fn url_item(arg: &str, options: &DiscoveryOptions) -> Result<UploadItem> {
    let url = url::Url::parse(arg).map_err(|e| Error::Discovery(format!("invalid URL {arg}: {e}")))?;
    let item = HttpUploadItem::new(
        options.client.clone(),
        url,
        options.basic_auth.clone(),
        &options.headers,
    )?;
    Ok(UploadItem::Http(item))
}

fn walk(
    root: &Path,
    options: &DiscoveryOptions,
    ledger: &Ledger,
    items: &mut Vec<UploadItem>,
) -> Result<()> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry
            .map_err(|e| Error::Discovery(format!("could not walk {}: {e}", root.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if has_excluded_extension(path, &options.excluded_extensions) {
            tracing::debug!(path = %path.display(), "excluded extension, skipping");
            continue;
        }

        let item = UploadItem::file(path);
        if ledger.contains(item.ledger_key()) {
            tracing::debug!(path = %path.display(), "already uploaded, skipping");
            continue;
        }
        items.push(item);
    }
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> DiscoveryOptions {
        DiscoveryOptions::new(
            reqwest::Client::new(),
            crate::config::DiscoveryConfig::default().excluded_extensions,
        )
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"x").unwrap();
    }

    fn identifiers(items: &[UploadItem]) -> Vec<String> {
        items.iter().map(|i| i.identifier()).collect()
    }

    async fn ledger_with(dir: &Path, lines: &[String]) -> Ledger {
        let path = dir.join("done.txt");
        std::fs::write(&path, lines.join("\n")).unwrap();
        Ledger::load(&path).await.unwrap()
    }

    #[test]
    fn walks_directories_in_name_order_and_skips_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("photos");
        touch(&root.join("b.jpg"));
        touch(&root.join("a.jpg"));
        touch(&root.join("clip.MOV"));
        touch(&root.join("clip.mov"));
        touch(&root.join("nested/c.png"));

        let args = vec![root.display().to_string()];
        let items = find_upload_items(&args, &options(), &Ledger::default()).unwrap();

        let root = root.display().to_string();
        assert_eq!(
            identifiers(&items),
            vec![
                format!("{root}/a.jpg"),
                format!("{root}/b.jpg"),
                format!("{root}/clip.mov"),
                format!("{root}/nested/c.png"),
            ]
        );
    }

    #[tokio::test]
    async fn skips_files_recorded_in_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("in/a.jpg");
        let b = dir.path().join("in/b.jpg");
        touch(&a);
        touch(&b);
        let ledger = ledger_with(dir.path(), &[a.display().to_string()]).await;

        let args = vec![dir.path().join("in").display().to_string()];
        let items = find_upload_items(&args, &options(), &ledger).unwrap();

        assert_eq!(identifiers(&items), vec![b.display().to_string()]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn non_utf8_siblings_are_tracked_separately() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("in");
        let uploaded = root.join(OsStr::from_bytes(b"caf\xe9.jpg"));
        let pending = root.join(OsStr::from_bytes(b"caf\xe8.jpg"));
        touch(&uploaded);
        touch(&pending);

        let ledger_path = dir.path().join("done.txt");
        {
            let mut writer = crate::ledger::LedgerWriter::open(&ledger_path)
                .await
                .unwrap();
            writer
                .append(UploadItem::file(&uploaded).ledger_key())
                .await
                .unwrap();
        }
        let ledger = Ledger::load(&ledger_path).await.unwrap();

        let args = vec![root.display().to_string()];
        let items = find_upload_items(&args, &options(), &ledger).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ledger_key(), UploadItem::file(&pending).ledger_key());
    }

    #[tokio::test]
    async fn everything_recorded_means_nothing_to_upload() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("in/a.jpg");
        touch(&a);
        let ledger = ledger_with(dir.path(), &[a.display().to_string()]).await;

        let args = vec![dir.path().join("in").display().to_string()];
        let err = find_upload_items(&args, &options(), &ledger).unwrap_err();

        assert!(matches!(err, Error::NothingToUpload(_)));
        assert!(err.to_string().starts_with("nothing to upload in "));
    }

    #[test]
    fn single_file_argument_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        touch(&a);

        let args = vec![a.display().to_string()];
        let items = find_upload_items(&args, &options(), &Ledger::default()).unwrap();
        assert_eq!(identifiers(&items), vec![a.display().to_string()]);
    }

    #[test]
    fn urls_become_http_items_and_skip_the_ledger() {
        let args = vec![
            "https://example.com/photos/cat.jpg".to_string(),
            "http://example.com/dog.jpg".to_string(),
        ];
        let items = find_upload_items(&args, &options(), &Ledger::default()).unwrap();

        assert!(items.iter().all(|i| matches!(i, UploadItem::Http(_))));
        assert_eq!(identifiers(&items), args);
        assert_eq!(items[0].name(), "cat.jpg");
    }

    #[test]
    fn invalid_url_is_a_discovery_error() {
        let args = vec!["http://[not-a-host/a.jpg".to_string()];
        let err = find_upload_items(&args, &options(), &Ledger::default()).unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
    }

    #[test]
    fn missing_path_is_a_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = vec![dir.path().join("nope").display().to_string()];
        let err = find_upload_items(&args, &options(), &Ledger::default()).unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
    }

    #[test]
    fn no_arguments_means_nothing_to_upload() {
        let err = find_upload_items(&[], &options(), &Ledger::default()).unwrap_err();
        assert_eq!(err.to_string(), "nothing to upload");
    }

    #[test]
    fn request_options_are_parsed() {
        let options = options()
            .with_basic_auth("alice:s3:cret")
            .unwrap()
            .with_header("X-Trace:  abc ")
            .unwrap();
        assert_eq!(
            options.basic_auth,
            Some(("alice".to_string(), "s3:cret".to_string()))
        );
        assert_eq!(
            options.headers,
            vec![("X-Trace".to_string(), "abc".to_string())]
        );

        assert!(matches!(
            DiscoveryOptions::default().with_basic_auth("alice"),
            Err(Error::Discovery(_))
        ));
        assert!(matches!(
            DiscoveryOptions::default().with_header("no colon"),
            Err(Error::Discovery(_))
        ));
    }

    #[test]
    fn invalid_header_value_fails_before_upload() {
        let options = options().with_header("X-Bad: a\nb").unwrap();
        let args = vec!["https://example.com/a.jpg".to_string()];
        let err = find_upload_items(&args, &options, &Ledger::default()).unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
    }
}
