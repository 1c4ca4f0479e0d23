// components/video_downloader/src/history.rs
use crate::platform::PlatformTarget;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// A previously downloaded file, derived from the folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub filename: String,
    pub platform: PlatformTarget,
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    /// `file://` link to the entry, absolute when the path can be resolved
    pub fn file_url(&self) -> Option<String> {
        let absolute = dunce::canonicalize(&self.path).ok()?;
        Url::from_file_path(absolute).ok().map(String::from)
    }

    /// Path relative to the download root, `<folder>/<filename>`
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.platform.folder_name(), self.filename)
    }
}

/// Read-only view over the per-platform download folders. Nothing is
/// cached: every call re-scans the folder.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Non-hidden entries of the platform folder, by filename descending.
    ///
    /// Filename order only approximates "most recent first". A missing
    /// folder is the same as an empty one.
    pub async fn list(&self, platform: PlatformTarget) -> io::Result<Vec<HistoryEntry>> {
        let dir = platform.destination(&self.root);
        let mut reader = match tokio::fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let filename = entry.file_name().to_string_lossy().into_owned();
            if filename.starts_with('.') {
                continue;
            }
            let modified = entry
                .metadata()
                .await
                .ok()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from);
            entries.push(HistoryEntry {
                path: entry.path(),
                filename,
                platform,
                modified,
            });
        }

        entries.sort_by(|a, b| b.filename.cmp(&a.filename));
        Ok(entries)
    }
}
