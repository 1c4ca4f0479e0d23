// components/video_downloader/src/sink.rs
//! Where downloaded bytes end up.
//!
//! A deployment picks one sink: [`DiskSink`] keeps files in the per-platform
//! folders, [`MemorySink`] hands the bytes back and retains nothing.

use crate::platform::PlatformTarget;
use crate::types::Delivery;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Answers whether a path already exists. Injected so duplicate detection
/// can be exercised without a real filesystem.
pub trait ExistenceOracle: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

pub struct FsOracle;

impl ExistenceOracle for FsOracle {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Directory the collaborator writes into. A scratch directory is removed
/// when the target is dropped, including after a failed download.
#[derive(Debug)]
pub struct WritableTarget {
    dir: PathBuf,
    _scratch: Option<TempDir>,
}

impl WritableTarget {
    pub fn persistent(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _scratch: None,
        }
    }

    pub fn scratch(scratch: TempDir) -> Self {
        Self {
            dir: scratch.path().to_path_buf(),
            _scratch: Some(scratch),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Final location of `filename` if this sink keeps files, used for the
    /// duplicate check
    fn persisted_path(&self, platform: PlatformTarget, filename: &str) -> Option<PathBuf>;

    async fn open(&self, platform: PlatformTarget) -> std::io::Result<WritableTarget>;

    /// Turn the file the collaborator produced inside `target` into a delivery
    async fn commit(&self, target: WritableTarget, produced: &Path) -> std::io::Result<Delivery>;
}

/// Persist into `<root>/<platform folder>`
pub struct DiskSink {
    root: PathBuf,
}

impl DiskSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl OutputSink for DiskSink {
    fn persisted_path(&self, platform: PlatformTarget, filename: &str) -> Option<PathBuf> {
        Some(platform.destination(&self.root).join(filename))
    }

    async fn open(&self, platform: PlatformTarget) -> std::io::Result<WritableTarget> {
        let dir = platform.destination(&self.root);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(WritableTarget::persistent(dir))
    }

    async fn commit(&self, _target: WritableTarget, produced: &Path) -> std::io::Result<Delivery> {
        // Fails if the collaborator reported a file that is not there
        tokio::fs::metadata(produced).await?;
        Ok(Delivery::Saved(produced.to_path_buf()))
    }
}

/// Download into a scratch directory and return the bytes
pub struct MemorySink {
    scratch_root: Option<PathBuf>,
}

impl MemorySink {
    /// Scratch directories under the system temp dir
    pub fn new() -> Self {
        Self { scratch_root: None }
    }

    pub fn in_dir(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: Some(scratch_root.into()),
        }
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    fn persisted_path(&self, _platform: PlatformTarget, _filename: &str) -> Option<PathBuf> {
        None
    }

    async fn open(&self, platform: PlatformTarget) -> std::io::Result<WritableTarget> {
        let prefix = format!("vdl-{}-", platform.folder_name());
        let scratch = match &self.scratch_root {
            Some(root) => {
                tokio::fs::create_dir_all(root).await?;
                tempfile::Builder::new().prefix(&prefix).tempdir_in(root)?
            }
            None => tempfile::Builder::new().prefix(&prefix).tempdir()?,
        };
        Ok(WritableTarget::scratch(scratch))
    }

    async fn commit(&self, target: WritableTarget, produced: &Path) -> std::io::Result<Delivery> {
        let bytes = tokio::fs::read(produced).await?;
        let filename = produced
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());
        drop(target);
        Ok(Delivery::Buffer { filename, bytes })
    }
}
