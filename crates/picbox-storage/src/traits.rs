//! Storage abstraction trait
//!
//! This module defines the Storage trait that the upload directory backend implements.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid filename: {0}")]
    InvalidKey(String),

    #[error("Unable to list directory {path}: {source}")]
    ListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to create directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked file content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// A file that has been committed to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub size_bytes: u64,
}

/// An upload in progress.
///
/// Nothing is visible under the final filename until `commit` succeeds. An upload that is
/// dropped without being committed leaves nothing behind.
#[async_trait]
pub trait UploadSink: Send {
    async fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()>;

    /// Make the file visible under its final name, replacing any file already there.
    async fn commit(&mut self) -> StorageResult<StoredFile>;

    /// Throw away everything written so far. No-op after a successful `commit`.
    async fn discard(&mut self);
}

/// Storage abstraction trait
///
/// Handlers only talk to this trait so tests can point the service at a temporary directory,
/// or at a backend that fails on purpose.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Make sure the root directory exists, creating it when missing.
    ///
    /// Idempotent: a directory that already exists (or appears concurrently) is success.
    async fn ensure_root(&self) -> StorageResult<()>;

    /// Start writing a new file that will be stored as `filename`.
    async fn begin_upload(&self, filename: &str) -> StorageResult<Box<dyn UploadSink>>;

    /// Names of the files `download_stream` would serve, in enumeration order.
    async fn list(&self) -> StorageResult<Vec<String>>;

    /// Open a stored file for streaming. Returns its length and its content.
    async fn download_stream(&self, filename: &str) -> StorageResult<(u64, ByteStream)>;

    /// Root directory served by this backend
    fn root(&self) -> &Path;
}
