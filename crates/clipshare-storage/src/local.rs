use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use clipshare_core::models::VideoAsset;
use clipshare_core::naming::asset_filename;
use clipshare_core::validation::file_extension;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Counters from one retention sweep. A sweep never fails as a whole;
/// per-entry failures are logged and tallied here.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub partitions: usize,
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Local filesystem partition store.
///
/// Layout: `<root>/<partition_key>/<filename>`. Partitions are created lazily
/// and never removed; only their contents expire.
#[derive(Clone)]
pub struct PartitionStore {
    root: PathBuf,
}

/// Removes the temp file on drop unless disarmed; keeps ingestion
/// cancel-safe (a timed-out upload must not leave a partial artifact).
struct TempFileGuard {
    path: Option<PathBuf>,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn disarm(mut self) {
        self.path = None;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(&path);
        }
    }
}

/// Reject path components that could escape the store root.
fn validate_component(component: &str) -> StorageResult<()> {
    if component.is_empty()
        || component.starts_with('.')
        || component.contains("..")
        || component.contains('/')
        || component.contains('\\')
    {
        return Err(StorageError::InvalidKey(
            "path component contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Creation time of an entry; filesystems without birth time fall back to
/// mtime (assets are immutable, so both agree in practice).
fn created_time(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.created()
        .or_else(|_| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

impl PartitionStore {
    /// Create a store rooted at `root`, creating the directory if absent.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage root {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(PartitionStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_path(&self, partition_key: &str) -> StorageResult<PathBuf> {
        validate_component(partition_key)?;
        Ok(self.root.join(partition_key))
    }

    fn entry_path(&self, partition_key: &str, filename: &str) -> StorageResult<PathBuf> {
        validate_component(filename)?;
        Ok(self.partition_path(partition_key)?.join(filename))
    }

    /// Create the partition directory for `partition_key` if it does not
    /// exist. Idempotent and safe to call concurrently.
    pub async fn ensure_partition(&self, partition_key: &str) -> StorageResult<PathBuf> {
        let dir = self.partition_path(partition_key)?;
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Stream an upload into the partition.
    ///
    /// Writes to a hidden `.{name}.part` staging file claimed with
    /// `create_new`, then renames to the final timestamp-derived name, so a
    /// partial upload is never visible under its final name and two uploads
    /// in the same millisecond get distinct names. Exceeding `max_bytes`
    /// aborts the write and removes the staging file.
    pub async fn ingest_stream<S, E>(
        &self,
        partition_key: &str,
        extension: &str,
        max_bytes: u64,
        mut stream: S,
    ) -> StorageResult<VideoAsset>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let dir = self.ensure_partition(partition_key).await?;
        let start = std::time::Instant::now();

        let (filename, tmp_path, mut file) = loop {
            let filename = asset_filename(Utc::now(), extension);
            if fs::try_exists(&dir.join(&filename)).await.unwrap_or(false) {
                continue;
            }
            let tmp_path = dir.join(format!(".{}.part", filename));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&tmp_path)
                .await
            {
                Ok(file) => break (filename, tmp_path, file),
                // Another upload claimed the same millisecond; take a fresh timestamp.
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StorageError::WriteFailed(format!(
                        "Failed to create staging file {}: {}",
                        tmp_path.display(),
                        e
                    )))
                }
            }
        };

        let guard = TempFileGuard::new(tmp_path.clone());
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| StorageError::WriteFailed(format!("Upload stream error: {}", e)))?;
            written += chunk.len() as u64;
            if written > max_bytes {
                return Err(StorageError::TooLarge {
                    written,
                    max: max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.sync_all().await?;
        drop(file);

        let final_path = dir.join(&filename);
        fs::rename(&tmp_path, &final_path).await?;
        guard.disarm();

        let meta = fs::metadata(&final_path).await?;
        let asset = VideoAsset {
            filename,
            size: meta.len(),
            created_at: created_time(&meta),
        };

        tracing::info!(
            partition = %partition_key,
            filename = %asset.filename,
            size_bytes = asset.size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Asset ingested"
        );

        Ok(asset)
    }

    /// Metadata for one asset; `NotFound` if it is not on disk.
    pub async fn stat(&self, partition_key: &str, filename: &str) -> StorageResult<VideoAsset> {
        let path = self.entry_path(partition_key, filename)?;
        let meta = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::NotFound(format!("{}/{}", partition_key, filename))
            } else {
                StorageError::IoError(e)
            }
        })?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(format!(
                "{}/{}",
                partition_key, filename
            )));
        }
        Ok(VideoAsset {
            filename: filename.to_string(),
            size: meta.len(),
            created_at: created_time(&meta),
        })
    }

    /// List video assets in a partition, most recent first. Stray non-video
    /// files are skipped silently; a missing partition is an empty catalog.
    pub async fn list(&self, partition_key: &str) -> StorageResult<Vec<VideoAsset>> {
        let dir = self.partition_path(partition_key)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let mut assets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if name.starts_with('.') {
                continue;
            }
            let is_video = file_extension(&name)
                .map(|ext| clipshare_core::constants::is_video_extension(&ext))
                .unwrap_or(false);
            if !is_video {
                continue;
            }
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                _ => continue,
            };
            assets.push(VideoAsset {
                filename: name,
                size: meta.len(),
                created_at: created_time(&meta),
            });
        }

        assets.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });

        Ok(assets)
    }

    /// Delete one asset. `NotFound` if it is already gone.
    pub async fn delete(&self, partition_key: &str, filename: &str) -> StorageResult<()> {
        let path = self.entry_path(partition_key, filename)?;
        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::NotFound(format!("{}/{}", partition_key, filename))
            } else {
                StorageError::IoError(e)
            }
        })?;
        tracing::info!(partition = %partition_key, filename = %filename, "Asset deleted");
        Ok(())
    }

    /// Open an asset as a chunked byte stream for serving.
    pub async fn read_stream(
        &self,
        partition_key: &str,
        filename: &str,
    ) -> StorageResult<(
        VideoAsset,
        Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>,
    )> {
        let asset = self.stat(partition_key, filename).await?;
        let path = self.entry_path(partition_key, filename)?;

        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::NotFound(format!("{}/{}", partition_key, filename))
            } else {
                StorageError::IoError(e)
            }
        })?;

        let stream = tokio_util::io::ReaderStream::new(file)
            .map(|result| result.map_err(StorageError::IoError));

        Ok((asset, Box::pin(stream)))
    }

    /// Delete every entry (in every partition) created before `cutoff`.
    ///
    /// Per-entry and per-partition errors are logged and counted, never
    /// propagated; an entry deleted concurrently by a user counts as already
    /// gone. Stale staging files age out through the same path.
    pub async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> SweepStats {
        let mut stats = SweepStats::default();

        let mut partitions = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, root = %self.root.display(), "Failed to enumerate partitions");
                stats.failed += 1;
                return stats;
            }
        };

        loop {
            let partition = match partitions.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read partition entry, continuing sweep");
                    stats.failed += 1;
                    continue;
                }
            };
            if !partition
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false)
            {
                continue;
            }
            stats.partitions += 1;
            self.sweep_partition(&partition.path(), cutoff, &mut stats)
                .await;
        }

        stats
    }

    async fn sweep_partition(&self, dir: &Path, cutoff: DateTime<Utc>, stats: &mut SweepStats) {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, partition = %dir.display(), "Unreadable partition, skipping");
                stats.failed += 1;
                return;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, partition = %dir.display(), "Failed to read entry, continuing");
                    stats.failed += 1;
                    continue;
                }
            };
            let path = entry.path();
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Failed to stat entry, continuing");
                    stats.failed += 1;
                    continue;
                }
            };
            stats.scanned += 1;
            if created_time(&meta) >= cutoff {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "Expired asset removed");
                    stats.deleted += 1;
                }
                // A user delete raced us; already gone is success.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Failed to remove expired asset");
                    stats.failed += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::convert::Infallible;
    use tempfile::tempdir;

    fn byte_stream(
        chunks: Vec<&'static [u8]>,
    ) -> impl Stream<Item = Result<Bytes, Infallible>> + Unpin {
        stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c)))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_ingest_and_read_round_trip() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();

        let asset = store
            .ingest_stream(
                "alice_example_com",
                "mp4",
                1024,
                byte_stream(vec![b"hello ", b"world"]),
            )
            .await
            .unwrap();

        assert_eq!(asset.size, 11);
        assert!(asset.filename.ends_with(".mp4"));

        let (stat, mut stream) = store
            .read_stream("alice_example_com", &asset.filename)
            .await
            .unwrap();
        assert_eq!(stat.size, 11);

        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(data, b"hello world");
    }

    #[tokio::test]
    async fn test_oversized_stream_leaves_no_residue() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();

        let result = store
            .ingest_stream(
                "alice_example_com",
                "mp4",
                8,
                byte_stream(vec![b"12345", b"67890"]),
            )
            .await;

        assert!(matches!(result, Err(StorageError::TooLarge { .. })));

        // Neither the final file nor the staging file may remain.
        let mut entries = std::fs::read_dir(dir.path().join("alice_example_com")).unwrap();
        assert!(entries.next().is_none());
    }

    #[tokio::test]
    async fn test_failing_stream_leaves_no_residue() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();

        let broken = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err("connection reset"),
        ]);

        let result = store
            .ingest_stream("alice_example_com", "mp4", 1024, broken)
            .await;
        assert!(matches!(result, Err(StorageError::WriteFailed(_))));

        let mut entries = std::fs::read_dir(dir.path().join("alice_example_com")).unwrap();
        assert!(entries.next().is_none());
    }

    #[tokio::test]
    async fn test_sequential_ingests_get_distinct_names() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();

        let a = store
            .ingest_stream("k", "mp4", 1024, byte_stream(vec![b"a"]))
            .await
            .unwrap();
        let b = store
            .ingest_stream("k", "mp4", 1024, byte_stream(vec![b"b"]))
            .await
            .unwrap();

        assert_ne!(a.filename, b.filename);
        assert_eq!(store.list("k").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_ingests_never_overwrite() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();

        let (a, b) = tokio::join!(
            store.ingest_stream("k", "mp4", 1024, byte_stream(vec![b"first"])),
            store.ingest_stream("k", "mp4", 1024, byte_stream(vec![b"second"])),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.filename, b.filename);
        let listed = store.list("k").await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_list_skips_strays_and_sorts_descending() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();

        let first = store
            .ingest_stream("k", "mp4", 1024, byte_stream(vec![b"one"]))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store
            .ingest_stream("k", "webm", 1024, byte_stream(vec![b"two"]))
            .await
            .unwrap();

        std::fs::write(dir.path().join("k").join("notes.txt"), b"stray").unwrap();
        std::fs::write(dir.path().join("k").join(".hidden.mp4.part"), b"tmp").unwrap();

        let listed = store.list("k").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].filename, second.filename);
        assert_eq!(listed[1].filename, first.filename);
        assert!(listed[0].created_at >= listed[1].created_at);
    }

    #[tokio::test]
    async fn test_list_missing_partition_is_empty() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();
        assert!(store.list("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_semantics() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();

        let asset = store
            .ingest_stream("k", "mp4", 1024, byte_stream(vec![b"x"]))
            .await
            .unwrap();

        store.delete("k", &asset.filename).await.unwrap();
        assert!(matches!(
            store.delete("k", &asset.filename).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(store.list("k").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();

        assert!(matches!(
            store.stat("..", "x.mp4").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.stat("k", "../../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.delete("k", ".hidden").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.read_stream("a/b", "x.mp4").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = PartitionStore::new(dir.path()).await.unwrap();

        store
            .ingest_stream("alice", "mp4", 1024, byte_stream(vec![b"a"]))
            .await
            .unwrap();
        store
            .ingest_stream("bob", "mov", 1024, byte_stream(vec![b"b"]))
            .await
            .unwrap();

        // Cutoff in the past: everything is younger, nothing is removed.
        let stats = store
            .sweep_expired(Utc::now() - chrono::Duration::hours(1))
            .await;
        assert_eq!(stats.deleted, 0);
        assert_eq!(stats.partitions, 2);
        assert_eq!(stats.scanned, 2);

        // Cutoff in the future: everything is older, both are removed.
        let stats = store
            .sweep_expired(Utc::now() + chrono::Duration::hours(1))
            .await;
        assert_eq!(stats.deleted, 2);
        assert_eq!(stats.failed, 0);

        // Re-running immediately is a no-op.
        let stats = store
            .sweep_expired(Utc::now() + chrono::Duration::hours(1))
            .await;
        assert_eq!(stats.deleted, 0);

        assert!(store.list("alice").await.unwrap().is_empty());
        assert!(store.list("bob").await.unwrap().is_empty());
    }
}
