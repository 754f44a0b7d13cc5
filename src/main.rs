//! photo-uploader command line.
//!
//! Discovers files and URLs, uploads them to the photo library in batches and
//! prints one result line per item on stdout. Logs go to stderr.

#![warn(clippy::all)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use photo_uploader::utils::expand_home;
use photo_uploader::{
    Config, DiscoveryOptions, Error, Ledger, PhotosClient, UploadItem, Uploader, find_upload_items,
};

/// Upload photos and videos to the photo library
#[derive(Debug, Parser)]
#[command(name = "photo-uploader", version, about)]
struct Cli {
    /// Files, directories or http(s) URLs to upload
    paths: Vec<String>,

    /// Add items to the album with this title, creating it if missing
    #[arg(long = "album", value_name = "TITLE", conflicts_with = "new_album")]
    album: Option<String>,

    /// Create a new album with this title and add items to it
    #[arg(long = "new-album", value_name = "TITLE")]
    new_album: Option<String>,

    /// Basic auth credentials for URL items
    #[arg(long, value_name = "USER:PASSWORD")]
    request_basic_auth: Option<String>,

    /// Extra header for URL items (repeatable)
    #[arg(long = "request-header", value_name = "NAME: VALUE")]
    request_headers: Vec<String>,

    /// Completion ledger file
    #[arg(long, value_name = "PATH")]
    ledger: Option<PathBuf>,

    /// Create the ledger file if it does not exist yet
    #[arg(long)]
    init_ledger: bool,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// OAuth access token for the photo library
    #[arg(long, env = "PHOTOS_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Items committed per batch (1-50)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Number of concurrent uploads
    #[arg(long)]
    concurrency: Option<usize>,

    /// Upload at any hour instead of waiting for the upload window
    #[arg(long)]
    ignore_time_window: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("could not load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(path) = &self.ledger {
            config.ledger.path = path.clone();
        }
        if let Some(token) = &self.access_token {
            config.api.access_token = Some(token.clone());
        }
        if let Some(batch_size) = self.batch_size {
            config.upload.batch_size = batch_size;
        }
        if let Some(concurrency) = self.concurrency {
            config.upload.concurrency = concurrency;
        }
        if self.ignore_time_window {
            config.availability.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }

    fn discovery_options(
        &self,
        config: &Config,
        client: reqwest::Client,
    ) -> anyhow::Result<DiscoveryOptions> {
        let mut options =
            DiscoveryOptions::new(client, config.discovery.excluded_extensions.clone());
        if let Some(auth) = &self.request_basic_auth {
            options = options.with_basic_auth(auth)?;
        }
        for header in &self.request_headers {
            options = options.with_header(header)?;
        }
        Ok(options)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether every item succeeded
///
/// Discovery that finds nothing new is a successful no-op; running without
/// any path is an error.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    if cli.paths.is_empty() {
        return Err(Error::NothingToUpload(String::new()).into());
    }
    let config = cli.load_config()?;

    let ledger_path = expand_home(&config.ledger.path)?;
    if cli.init_ledger {
        Ledger::ensure_exists(&ledger_path).await?;
    }
    let ledger = Ledger::load(&ledger_path).await.with_context(|| {
        format!(
            "could not read ledger {} (run with --init-ledger to create it)",
            ledger_path.display()
        )
    })?;

    let http = reqwest::Client::new();
    let options = cli.discovery_options(&config, http.clone())?;
    let items = match find_upload_items(&cli.paths, &options, &ledger) {
        Ok(items) => items,
        Err(Error::NothingToUpload(detail)) => {
            eprintln!("nothing to upload{detail}");
            return Ok(true);
        }
        Err(e) => return Err(e.into()),
    };

    eprintln!("The following {} items will be uploaded:", items.len());
    for (i, item) in items.iter().enumerate() {
        eprintln!("#{}: {}", i + 1, item);
    }
    let identifiers: Vec<String> = items.iter().map(UploadItem::identifier).collect();

    let client = PhotosClient::new(&config.api, http)?;
    let uploader = Uploader::new(config, Arc::new(client))?;

    let report = match (&cli.album, &cli.new_album) {
        (Some(title), _) => uploader.add_to_album(title, items).await?,
        (None, Some(title)) => uploader.create_album(title, items).await?,
        (None, None) => uploader.add_to_library(items).await?,
    };

    for line in report.result_lines(&identifiers) {
        println!("{line}");
    }

    if let Some(e) = &report.ledger_error {
        eprintln!("warning: {e}");
        eprintln!(
            "the following {} uploaded items were not recorded and will be uploaded again next run:",
            report.unrecorded.len()
        );
        for identifier in &report.unrecorded {
            eprintln!("  {identifier}");
        }
    }

    Ok(report.failed() == 0)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
