// components/video_downloader/src/lib.rs
mod classify;
mod history;
mod options;
mod platform;
mod progress;
mod sink;
mod types;
mod ytdlp;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, info, warn};

pub use classify::{classify, detect_platform, is_playlist, is_supported, ClassificationError, VideoReference};
pub use history::{HistoryEntry, HistoryStore};
pub use options::{
    format_selector, predicted_filename, sanitize_title, ExtractorOptions, PostProcessor,
    AUDIO_BITRATE_KBPS, DEFAULT_USER_AGENT,
};
pub use platform::{ensure_layout, PlatformTarget};
pub use progress::{
    percent_of, NoProgress, ProgressEvent, ProgressSink, ProgressTracker, TracingProgress,
    DEFAULT_HIDE_DELAY,
};
pub use sink::{DiskSink, ExistenceOracle, FsOracle, MemorySink, OutputSink, WritableTarget};
pub use types::{
    Delivery, DownloadError, DownloadMode, DownloadRequest, DownloadResult, ExtractError,
    MediaInfo, PreviewInfo, Quality,
};
pub use ytdlp::{Extractor, YtDlp};

/// Tunables shared by every download
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub user_agent: String,
    pub hide_delay: Duration,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            hide_delay: DEFAULT_HIDE_DELAY,
        }
    }
}

/// Previews and downloads videos through an [`Extractor`], delivering the
/// result to an [`OutputSink`]
pub struct VideoDownloader {
    extractor: Arc<dyn Extractor>,
    sink: Arc<dyn OutputSink>,
    oracle: Arc<dyn ExistenceOracle>,
    settings: DownloadSettings,
}

impl VideoDownloader {
    /// yt-dlp from `PATH`, saving into per-platform folders below `root`
    pub async fn new(root: impl Into<std::path::PathBuf>) -> Result<Self, DownloadError> {
        let root = root.into();
        ensure_layout(&root).await?;
        Self::new_with_extractor(Arc::new(YtDlp::new()), Arc::new(DiskSink::new(root))).await
    }

    /// Create a VideoDownloader with a specific extractor and sink
    pub async fn new_with_extractor(
        extractor: Arc<dyn Extractor>,
        sink: Arc<dyn OutputSink>,
    ) -> Result<Self, DownloadError> {
        extractor.check_available().await?;

        Ok(Self {
            extractor,
            sink,
            oracle: Arc::new(FsOracle),
            settings: DownloadSettings::default(),
        })
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn ExistenceOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_settings(mut self, settings: DownloadSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    /// Metadata for a preview. Any failure means "no preview".
    pub async fn fetch_preview(&self, url: &str) -> Option<PreviewInfo> {
        match self.extractor.extract_info(url).await {
            Ok(info) => Some(PreviewInfo::from_media_info(info)),
            Err(e) => {
                debug!(url, error = %e, "preview unavailable");
                None
            }
        }
    }

    /// Download `request`, reporting progress to `progress`.
    ///
    /// The duplicate check is a best-effort probe: two concurrent requests
    /// for the same title can both pass it and the later one overwrites
    /// the earlier file.
    pub async fn download(&self, request: &DownloadRequest, progress: &dyn ProgressSink) -> DownloadResult {
        let platform = request.reference().platform();
        info!(url = request.url(), %platform, mode = ?request.mode(), "download requested");

        let stem = match self.extractor.extract_info(request.url()).await {
            Ok(info) => {
                let filename = predicted_filename(info.title.as_deref(), request.mode());
                if let Some(path) = self.sink.persisted_path(platform, &filename) {
                    if self.oracle.exists(&path) {
                        warn!(path = %path.display(), "already downloaded");
                        return DownloadResult::AlreadyExists { path };
                    }
                }
                filename
                    .rsplit_once('.')
                    .map(|(stem, _)| stem.to_string())
            }
            Err(e) => {
                debug!(error = %e, "probe failed, skipping duplicate check");
                None
            }
        };

        let target = match self.sink.open(platform).await {
            Ok(target) => target,
            Err(e) => return DownloadResult::Failure { message: e.to_string() },
        };

        let options = ExtractorOptions::for_request(
            request,
            target.dir(),
            stem.as_deref(),
            &self.settings.user_agent,
        );

        let (tx, rx) = unbounded_channel();
        let tracker = ProgressTracker::new(progress, self.settings.hide_delay);
        let (outcome, ()) = tokio::join!(
            self.extractor.download(request.url(), &options, tx),
            tracker.drive(rx)
        );

        let produced = match outcome {
            Ok(path) => path,
            Err(e) => {
                warn!(url = request.url(), error = %e, "download failed");
                return DownloadResult::Failure { message: e.to_string() };
            }
        };

        match self.sink.commit(target, &produced).await {
            Ok(delivery) => {
                info!(file = %delivery.filename(), "download complete");
                DownloadResult::Success(delivery)
            }
            Err(e) => DownloadResult::Failure { message: e.to_string() },
        }
    }
}
