use crate::traits::{ByteStream, Storage, StorageError, StorageResult, StoredFile, UploadSink};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Prefix of in-flight upload files. Never listed, never served.
const UPLOAD_TEMP_PREFIX: &str = ".upload-";
const UPLOAD_TEMP_SUFFIX: &str = ".part";

/// Local filesystem storage implementation
///
/// All files live directly under `base_path`. The directory is not created eagerly: it appears
/// on the first upload (or an explicit [`Storage::ensure_root`]).
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        LocalStorage {
            base_path: base_path.into(),
        }
    }

    /// Convert a filename to a path inside the base directory.
    ///
    /// The name must be exactly one normal, non-hidden path component. When the target already
    /// exists its canonical path must still sit inside the base directory, so a symlink planted
    /// in the upload directory cannot point the server elsewhere.
    fn key_to_path(&self, filename: &str) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename.starts_with('.')
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains('\0')
        {
            return Err(StorageError::InvalidKey(filename.to_string()));
        }

        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(StorageError::InvalidKey(filename.to_string())),
        }

        let path = self.base_path.join(filename);

        if let (Ok(base_canonical), Ok(canonical)) =
            (self.base_path.canonicalize(), path.canonicalize())
        {
            if canonical.strip_prefix(&base_canonical).is_err() {
                tracing::warn!(
                    filename = %filename,
                    resolved = %canonical.display(),
                    "Filename resolves outside storage directory"
                );
                return Err(StorageError::InvalidKey(filename.to_string()));
            }
        }

        Ok(path)
    }

    /// Whether `name` follows through to a regular file that may be served.
    async fn resolves_to_file(&self, name: &str) -> bool {
        let Ok(path) = self.key_to_path(name) else {
            return false;
        };
        fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join(format!(
            "{}{}{}",
            UPLOAD_TEMP_PREFIX,
            Uuid::new_v4(),
            UPLOAD_TEMP_SUFFIX
        ))
    }

    fn is_temp_name(name: &str) -> bool {
        name.starts_with(UPLOAD_TEMP_PREFIX) && name.ends_with(UPLOAD_TEMP_SUFFIX)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn ensure_root(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|source| StorageError::CreateDirFailed {
                path: self.base_path.clone(),
                source,
            })
    }

    async fn begin_upload(&self, filename: &str) -> StorageResult<Box<dyn UploadSink>> {
        let target = self.key_to_path(filename)?;
        self.ensure_root().await?;

        let temp = self.temp_path();
        let file = fs::File::create(&temp).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", temp.display(), e))
        })?;

        tracing::debug!(
            filename = %filename,
            temp = %temp.display(),
            "Local storage upload started"
        );

        Ok(Box::new(LocalUpload {
            filename: filename.to_string(),
            target,
            temp,
            file: Some(file),
            written: 0,
            committed: false,
            discarded: false,
            started: Instant::now(),
        }))
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let list_failed = |source| StorageError::ListFailed {
            path: self.base_path.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.base_path).await.map_err(list_failed)?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(list_failed)? {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if Self::is_temp_name(&name) {
                continue;
            }
            let file_type = entry.file_type().await.map_err(list_failed)?;
            let listed = if file_type.is_symlink() {
                self.resolves_to_file(&name).await
            } else {
                file_type.is_file() && self.key_to_path(&name).is_ok()
            };
            if listed {
                names.push(name);
            }
        }

        Ok(names)
    }

    async fn download_stream(&self, filename: &str) -> StorageResult<(u64, ByteStream)> {
        let path = self.key_to_path(filename)?;
        let start = Instant::now();

        let meta = match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(StorageError::NotFound(filename.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to stat file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(
                    path = %path_display,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream download error"
                );
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok((meta.len(), Box::pin(stream)))
    }

    fn root(&self) -> &Path {
        &self.base_path
    }
}

/// Upload written to a hidden temp file and renamed over the target on commit.
///
/// Failed uploads are removed by `discard`. An upload dropped while still open (client
/// disconnect) has its temp file removed on the blocking pool, so a partial upload never shows
/// up under a final name.
struct LocalUpload {
    filename: String,
    target: PathBuf,
    temp: PathBuf,
    file: Option<fs::File>,
    written: u64,
    committed: bool,
    discarded: bool,
    started: Instant,
}

#[async_trait]
impl UploadSink for LocalUpload {
    async fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StorageError::UploadFailed("Upload already finished".to_string()))?;

        file.write_all(chunk).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                self.temp.display(),
                e
            ))
        })?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    async fn commit(&mut self) -> StorageResult<StoredFile> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| StorageError::UploadFailed("Upload already finished".to_string()))?;

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                self.temp.display(),
                e
            ))
        })?;
        drop(file);

        fs::rename(&self.temp, &self.target).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to move {} to {}: {}",
                self.temp.display(),
                self.target.display(),
                e
            ))
        })?;
        self.committed = true;

        tracing::info!(
            path = %self.target.display(),
            filename = %self.filename,
            size_bytes = self.written,
            duration_ms = self.started.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredFile {
            filename: self.filename.clone(),
            size_bytes: self.written,
        })
    }

    async fn discard(&mut self) {
        if self.committed || self.discarded {
            return;
        }
        self.file.take();
        self.discarded = true;
        log_temp_removal(&self.temp, self.written, fs::remove_file(&self.temp).await);
    }
}

fn log_temp_removal(temp: &Path, written: u64, result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::debug!(
            path = %temp.display(),
            size_bytes = written,
            "Discarded incomplete upload"
        ),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %temp.display(),
            error = %e,
            "Failed to remove incomplete upload"
        ),
    }
}

impl Drop for LocalUpload {
    fn drop(&mut self) {
        if self.committed || self.discarded {
            return;
        }
        self.file.take();
        let temp = std::mem::take(&mut self.temp);
        let written = self.written;
        let remove = move || log_temp_removal(&temp, written, std::fs::remove_file(&temp));
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(remove);
            }
            Err(_) => remove(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn read_all(storage: &LocalStorage, filename: &str) -> Vec<u8> {
        let (len, mut stream) = storage.download_stream(filename).await.unwrap();
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(len as usize, out.len());
        out
    }

    async fn store(storage: &LocalStorage, filename: &str, data: &[u8]) -> StoredFile {
        let mut upload = storage.begin_upload(filename).await.unwrap();
        upload.write_chunk(data).await.unwrap();
        upload.commit().await.unwrap()
    }

    #[tokio::test]
    async fn upload_then_download() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let stored = store(&storage, "1.png", b"\x89PNG data").await;
        assert_eq!(stored.filename, "1.png");
        assert_eq!(stored.size_bytes, 9);

        assert_eq!(read_all(&storage, "1.png").await, b"\x89PNG data");
        assert!(dir.path().join("1.png").is_file());
    }

    #[tokio::test]
    async fn first_upload_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("uploads");
        let storage = LocalStorage::new(&root);

        assert!(!root.exists());
        store(&storage, "1.gif", b"GIF89a").await;
        assert!(root.join("1.gif").is_file());
    }

    #[tokio::test]
    async fn ensure_root_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("uploads"));
        storage.ensure_root().await.unwrap();
        storage.ensure_root().await.unwrap();
        assert!(storage.root().is_dir());
    }

    #[tokio::test]
    async fn list_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("never-created"));
        let err = storage.list().await.unwrap_err();
        assert!(matches!(err, StorageError::ListFailed { .. }));
    }

    #[tokio::test]
    async fn list_returns_regular_files_only() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        store(&storage, "a.png", b"a").await;
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let mut names = storage.list().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["a.png".to_string(), "notes.txt".to_string()]);
    }

    #[tokio::test]
    async fn discarded_upload_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let mut upload = storage.begin_upload("2.png").await.unwrap();
        upload.write_chunk(b"half of a pict").await.unwrap();

        // In flight: the temp file exists but is not listed.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(storage.list().await.unwrap().is_empty());

        upload.discard().await;
        upload.discard().await;

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn dropped_upload_is_removed_in_background() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let mut upload = storage.begin_upload("3.png").await.unwrap();
        upload.write_chunk(b"cut off").await.unwrap();
        drop(upload);

        for _ in 0..100 {
            if std::fs::read_dir(dir.path()).unwrap().count() == 0 {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("temp file still present after drop");
    }

    #[tokio::test]
    async fn discard_after_commit_keeps_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let mut upload = storage.begin_upload("4.png").await.unwrap();
        upload.write_chunk(b"kept").await.unwrap();
        upload.commit().await.unwrap();
        upload.discard().await;

        assert_eq!(read_all(&storage, "4.png").await, b"kept");
    }

    #[tokio::test]
    async fn same_name_upload_overwrites() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        store(&storage, "1700000000000.png", b"first").await;
        store(&storage, "1700000000000.png", b"second").await;

        assert_eq!(storage.list().await.unwrap().len(), 1);
        assert_eq!(read_all(&storage, "1700000000000.png").await, b"second");
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
        let storage = LocalStorage::new(&root);

        for name in [
            "../secret.txt",
            "..",
            ".",
            "",
            "/etc/passwd",
            "a/b.png",
            "..\\secret.txt",
            ".hidden.png",
            ".upload-x.part",
        ] {
            let err = storage.download_stream(name).await.err().unwrap();
            assert!(
                matches!(err, StorageError::InvalidKey(_)),
                "{name:?} should be rejected, got {err:?}"
            );
            assert!(storage.begin_upload(name).await.is_err());
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_escaping_root_is_rejected() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
        std::os::unix::fs::symlink(dir.path().join("secret.txt"), root.join("link.png")).unwrap();
        let storage = LocalStorage::new(&root);

        let err = storage.download_stream("link.png").await.err().unwrap();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn list_agrees_with_download_for_symlinks() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("1.png"), b"real").unwrap();
        std::fs::write(dir.path().join("secret.png"), b"secret").unwrap();
        std::os::unix::fs::symlink(root.join("1.png"), root.join("alias.png")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("secret.png"), root.join("escape.png")).unwrap();
        std::os::unix::fs::symlink(root.join("gone.png"), root.join("dangling.png")).unwrap();
        std::fs::write(root.join(".hidden.png"), b"hidden").unwrap();
        let storage = LocalStorage::new(&root);

        let mut names = storage.list().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["1.png".to_string(), "alias.png".to_string()]);

        for name in ["1.png", "alias.png"] {
            assert!(storage.download_stream(name).await.is_ok(), "{name} not served");
        }
        for name in ["escape.png", "dangling.png", ".hidden.png"] {
            assert!(storage.download_stream(name).await.is_err(), "{name} served");
        }
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let err = storage.download_stream("nope.png").await.err().unwrap();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
