//! Shared fixtures for integration tests: a fake photo library on wiremock.

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::path::Path;

use photo_uploader::Config;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "test-token";

/// Upload endpoint: answers with `token-<file name>`
pub struct UploadResponder;

impl Respond for UploadResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let name = request
            .headers
            .get("X-Goog-Upload-File-Name")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unnamed");
        ResponseTemplate::new(200).set_body_string(format!("token-{name}"))
    }
}

/// Batch create endpoint: succeeds for every entry except rejected descriptions
pub struct BatchCreateResponder {
    pub rejected: HashSet<String>,
}

impl Respond for BatchCreateResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let results: Vec<Value> = body["newMediaItems"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| {
                let description = entry["description"].as_str().unwrap_or_default();
                let token = entry["simpleMediaItem"]["uploadToken"].clone();
                if self.rejected.contains(description) {
                    json!({
                        "uploadToken": token,
                        "status": {"code": 3, "message": "Failed: unsupported media"}
                    })
                } else {
                    json!({
                        "uploadToken": token,
                        "status": {"message": "Success"},
                        "mediaItem": {
                            "id": format!("media-{description}"),
                            "description": description,
                            "filename": description
                        }
                    })
                }
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "newMediaItemResults": results }))
    }
}

/// Start a fake library whose commits reject the given descriptions
pub async fn photo_library(rejected: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/uploads"))
        .respond_with(UploadResponder)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/mediaItems:batchCreate"))
        .respond_with(BatchCreateResponder {
            rejected: rejected.iter().map(|s| s.to_string()).collect(),
        })
        .mount(&server)
        .await;
    server
}

/// Configuration pointing at `server` with the ledger inside `dir`
pub fn config_for(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.access_token = Some(ACCESS_TOKEN.to_string());
    config.availability.enabled = false;
    config.ledger.path = dir.join("done.txt");
    config.upload.batch_size = 2;
    config.upload.concurrency = 3;
    config
}

/// Create a file with `contents`, including parent directories
pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Lines of the ledger file, in order
pub fn ledger_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
