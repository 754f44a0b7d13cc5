//! In-memory [`PhotosApi`] for orchestrator tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::item::UploadItem;
use crate::photos::PhotosApi;
use crate::types::{
    Album, AlbumId, BatchCreateRequest, BatchCreateResponse, MediaItem, NewMediaItemResult,
    Status, UploadToken,
};

/// Scripted photo library.
///
/// Uploads succeed with token `token:<name>` unless the item's name is listed
/// in `failing_uploads`. Commits return status 0 unless the name has an entry
/// in `status_codes`.
#[derive(Default)]
pub(crate) struct FakePhotosApi {
    pub(crate) failing_uploads: HashSet<String>,
    pub(crate) upload_delays: HashMap<String, Duration>,
    pub(crate) status_codes: HashMap<String, i32>,
    /// Zero-based commit call numbers that fail as a whole
    pub(crate) failing_commits: HashSet<usize>,
    /// Names whose result is left out of the commit response
    pub(crate) omitted_results: HashSet<String>,
    pub(crate) albums: Mutex<Vec<Album>>,
    pub(crate) fail_album_listing: bool,

    pub(crate) uploads: Mutex<Vec<String>>,
    pub(crate) commits: Mutex<Vec<BatchCreateRequest>>,
    pub(crate) created_albums: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
}

impl FakePhotosApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_upload(mut self, name: &str) -> Self {
        self.failing_uploads.insert(name.to_string());
        self
    }

    pub(crate) fn delay_upload(mut self, name: &str, delay: Duration) -> Self {
        self.upload_delays.insert(name.to_string(), delay);
        self
    }

    pub(crate) fn with_status(mut self, name: &str, code: i32) -> Self {
        self.status_codes.insert(name.to_string(), code);
        self
    }

    pub(crate) fn fail_commit(mut self, call: usize) -> Self {
        self.failing_commits.insert(call);
        self
    }

    pub(crate) fn omit_result(mut self, name: &str) -> Self {
        self.omitted_results.insert(name.to_string());
        self
    }

    pub(crate) fn failing_album_listing(mut self) -> Self {
        self.fail_album_listing = true;
        self
    }

    pub(crate) fn with_album(self, id: &str, title: &str) -> Self {
        self.albums.lock().unwrap().push(Album {
            id: AlbumId(id.to_string()),
            title: title.to_string(),
            product_url: None,
        });
        self
    }

    pub(crate) fn token_for(name: &str) -> UploadToken {
        UploadToken::new(format!("token:{name}"))
    }

    /// Descriptions of every committed entry, per commit call
    pub(crate) fn committed_names(&self) -> Vec<Vec<String>> {
        self.commits
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.new_media_items.iter().map(|i| i.description.clone()).collect())
            .collect()
    }
}

#[async_trait::async_trait]
impl PhotosApi for FakePhotosApi {
    async fn upload_bytes(&self, item: &UploadItem) -> Result<UploadToken> {
        let name = item.name();
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .upload_delays
            .get(&name)
            .copied()
            .unwrap_or(Duration::from_millis(2));
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.uploads.lock().unwrap().push(name.clone());

        if self.failing_uploads.contains(&name) {
            return Err(Error::Other(format!("simulated upload failure for {name}")));
        }
        Ok(Self::token_for(&name))
    }

    async fn batch_create_media_items(
        &self,
        request: &BatchCreateRequest,
    ) -> Result<BatchCreateResponse> {
        let call = {
            let mut commits = self.commits.lock().unwrap();
            commits.push(request.clone());
            commits.len() - 1
        };
        if self.failing_commits.contains(&call) {
            return Err(Error::Api {
                status: 500,
                message: "simulated commit failure".to_string(),
            });
        }

        let new_media_item_results = request
            .new_media_items
            .iter()
            .filter(|entry| !self.omitted_results.contains(&entry.description))
            .map(|entry| {
                let code = self
                    .status_codes
                    .get(&entry.description)
                    .copied()
                    .unwrap_or(0);
                NewMediaItemResult {
                    upload_token: entry.simple_media_item.upload_token.clone(),
                    status: Status {
                        code,
                        message: if code == 0 {
                            "Success".to_string()
                        } else {
                            format!("rejected {}", entry.description)
                        },
                    },
                    media_item: (code == 0).then(|| MediaItem {
                        id: format!("media:{}", entry.description),
                        description: entry.description.clone(),
                        filename: entry.description.clone(),
                        product_url: None,
                    }),
                }
            })
            .collect();

        Ok(BatchCreateResponse {
            new_media_item_results,
        })
    }

    async fn find_album_by_title(&self, title: &str) -> Result<Option<Album>> {
        if self.fail_album_listing {
            return Err(Error::Api {
                status: 403,
                message: "forbidden".to_string(),
            });
        }
        Ok(self
            .albums
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.title == title)
            .cloned())
    }

    async fn create_album(&self, title: &str) -> Result<Album> {
        self.created_albums.lock().unwrap().push(title.to_string());
        let album = Album {
            id: AlbumId(format!("album:{title}")),
            title: title.to_string(),
            product_url: None,
        };
        self.albums.lock().unwrap().push(album.clone());
        Ok(album)
    }
}
