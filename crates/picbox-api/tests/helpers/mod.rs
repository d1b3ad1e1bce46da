//! Test helpers: build the app over a temporary upload directory.
//!
//! Run from workspace root: `cargo test -p picbox-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use picbox_api::constants::PHOTO_FIELD;
use picbox_api::setup;
use picbox_core::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test application: server plus the temporary directory it stores into.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names currently in the upload directory (empty when it does not exist).
    pub fn stored_files(&self) -> Vec<String> {
        stored_files(&self.upload_dir)
    }

    /// Put a file in the upload directory behind the service's back.
    pub fn seed_file(&self, name: &str, content: &[u8]) {
        std::fs::create_dir_all(&self.upload_dir).unwrap();
        std::fs::write(self.upload_dir.join(name), content).unwrap();
    }

    pub async fn upload(&self, filename: &str, mime: &str, content: Vec<u8>) -> TestResponse {
        self.server
            .post("/upload")
            .multipart(photo_form(filename, mime, content))
            .await
    }
}

/// Setup test app with default configuration. The upload directory does not exist yet.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|config| config).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(configure: impl FnOnce(Config) -> Config) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let upload_dir = temp_dir.path().join("uploads");

    let config = configure(Config::default().with_upload_dir(&upload_dir));
    let (_state, router) = setup::initialize_app(config)
        .await
        .expect("Failed to initialize app");

    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with one file under the `photo` field.
pub fn photo_form(filename: &str, mime: &str, content: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(PHOTO_FIELD, file_part(filename, mime, content))
}

pub fn file_part(filename: &str, mime: &str, content: Vec<u8>) -> Part {
    Part::bytes(bytes::Bytes::from(content))
        .file_name(filename.to_string())
        .mime_type(mime.to_string())
}

pub fn stored_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
