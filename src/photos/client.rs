//! HTTP client for the photo library REST API.

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::item::UploadItem;
use crate::types::{Album, BatchCreateRequest, BatchCreateResponse, UploadToken};

use super::PhotosApi;

/// Albums requested per listing page (service maximum)
const ALBUM_PAGE_SIZE: u32 = 50;

#[derive(Serialize)]
struct CreateAlbumRequest<'a> {
    album: NewAlbum<'a>,
}

#[derive(Serialize)]
struct NewAlbum<'a> {
    title: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ListAlbumsResponse {
    #[serde(default)]
    albums: Vec<Album>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Production [`PhotosApi`] speaking JSON over HTTPS with a bearer token.
#[derive(Clone, Debug)]
pub struct PhotosClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl PhotosClient {
    /// Build a client from the API section of the configuration
    pub fn new(config: &ApiConfig, http: reqwest::Client) -> Result<Self> {
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::config("an access token is required", "api.access_token"))?;
        url::Url::parse(&config.base_url).map_err(|e| {
            Error::config(
                format!("invalid base URL {:?}: {}", config.base_url, e),
                "api.base_url",
            )
        })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`Error::Api`]
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body
        };
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn list_albums_page(&self, page_token: Option<&str>) -> Result<ListAlbumsResponse> {
        let mut request = self
            .http
            .get(self.endpoint("albums"))
            .bearer_auth(&self.access_token)
            .query(&[("pageSize", ALBUM_PAGE_SIZE.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl PhotosApi for PhotosClient {
    async fn upload_bytes(&self, item: &UploadItem) -> Result<UploadToken> {
        let stream = item.open().await?;

        let mut request = self
            .http
            .post(self.endpoint("uploads"))
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header("X-Goog-Upload-Protocol", "raw");
        // Names that are not valid header text are sent without the hint
        if let Ok(name) = HeaderValue::from_str(&item.name()) {
            request = request.header("X-Goog-Upload-File-Name", name);
        }

        let response = request
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await?;
        let token = Self::check(response).await?.text().await?;
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Other(
                "service returned an empty upload token".to_string(),
            ));
        }
        Ok(UploadToken::new(token))
    }

    async fn batch_create_media_items(
        &self,
        request: &BatchCreateRequest,
    ) -> Result<BatchCreateResponse> {
        let response = self
            .http
            .post(self.endpoint("mediaItems:batchCreate"))
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn find_album_by_title(&self, title: &str) -> Result<Option<Album>> {
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list_albums_page(page_token.as_deref()).await?;
            if let Some(album) = page.albums.into_iter().find(|a| a.title == title) {
                return Ok(Some(album));
            }
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => return Ok(None),
            }
        }
    }

    async fn create_album(&self, title: &str) -> Result<Album> {
        let response = self
            .http
            .post(self.endpoint("albums"))
            .bearer_auth(&self.access_token)
            .json(&CreateAlbumRequest {
                album: NewAlbum { title },
            })
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
