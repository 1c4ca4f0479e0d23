// components/video_downloader/src/types.rs
use crate::classify::{ClassificationError, VideoReference};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Failures of the extraction collaborator
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    /// Message reported by the collaborator, passed through verbatim
    #[error("{0}")]
    Failed(String),

    #[error("Could not read collaborator output: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Playlist rejected: {0}")]
    PlaylistRejected(String),

    #[error("Platform undetected: {0}")]
    PlatformUndetected(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailure(#[from] ExtractError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DownloadError {
    /// Map a classification failure for `url` into the pipeline taxonomy
    pub fn from_classification(url: &str, err: ClassificationError) -> Self {
        match err {
            ClassificationError::Invalid => DownloadError::InvalidUrl(url.to_string()),
            ClassificationError::Playlist => DownloadError::PlaylistRejected(url.to_string()),
            ClassificationError::PlatformUndetected(url) => DownloadError::PlatformUndetected(url),
        }
    }
}

/// What the collaborator reports about a URL without downloading it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    /// Seconds; some extractors report fractions
    pub duration: Option<f64>,
    pub webpage_url: Option<String>,
    pub ext: Option<String>,
}

/// Read-only metadata shown before a download
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewInfo {
    pub title: String,
    pub thumbnail_url: String,
    pub duration_seconds: Option<u64>,
}

impl PreviewInfo {
    pub fn from_media_info(info: MediaInfo) -> Self {
        Self {
            title: info.title.unwrap_or_default(),
            thumbnail_url: info.thumbnail.unwrap_or_default(),
            duration_seconds: info
                .duration
                .filter(|d| d.is_finite() && *d >= 0.0)
                .map(|d| d.round() as u64),
        }
    }

    /// `m:ss` or `h:mm:ss`
    pub fn duration_label(&self) -> Option<String> {
        self.duration_seconds.map(|total| {
            let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
            if h > 0 {
                format!("{}:{:02}:{:02}", h, m, s)
            } else {
                format!("{}:{:02}", m, s)
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadMode {
    Video,
    AudioOnly,
}

impl DownloadMode {
    pub fn extension(&self) -> &'static str {
        match self {
            DownloadMode::Video => "mp4",
            DownloadMode::AudioOnly => "mp3",
        }
    }
}

impl FromStr for DownloadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(DownloadMode::Video),
            "audio" | "audio_only" => Ok(DownloadMode::AudioOnly),
            _ => Err(format!("unknown download mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    High,
    /// Capped at 360p, see `options::format_selector`
    Medium360p,
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Quality::High),
            "medium" | "medium_360p" | "360p" => Ok(Quality::Medium360p),
            _ => Err(format!("unknown quality: {}", s)),
        }
    }
}

/// A download the user asked for. Only built from a classified reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    video: VideoReference,
    mode: DownloadMode,
    quality: Option<Quality>,
}

impl DownloadRequest {
    pub fn video(video: VideoReference, quality: Quality) -> Self {
        Self {
            video,
            mode: DownloadMode::Video,
            quality: Some(quality),
        }
    }

    pub fn audio_only(video: VideoReference) -> Self {
        Self {
            video,
            mode: DownloadMode::AudioOnly,
            quality: None,
        }
    }

    /// Build from form selections. Quality is dropped for audio and
    /// defaults to `High` for video.
    pub fn new(video: VideoReference, mode: DownloadMode, quality: Option<Quality>) -> Self {
        match mode {
            DownloadMode::Video => Self::video(video, quality.unwrap_or(Quality::High)),
            DownloadMode::AudioOnly => Self::audio_only(video),
        }
    }

    pub fn reference(&self) -> &VideoReference {
        &self.video
    }

    pub fn url(&self) -> &str {
        self.video.url()
    }

    pub fn mode(&self) -> DownloadMode {
        self.mode
    }

    pub fn quality(&self) -> Option<Quality> {
        self.quality
    }
}

/// Where the bytes of a finished download ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Saved(PathBuf),
    Buffer { filename: String, bytes: Vec<u8> },
}

impl Delivery {
    pub fn filename(&self) -> String {
        match self {
            Delivery::Saved(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Delivery::Buffer { filename, .. } => filename.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    Success(Delivery),
    /// The predicted file is already in the destination folder
    AlreadyExists { path: PathBuf },
    Failure { message: String },
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadResult::Success(_))
    }

    /// One-shot directive for the form: empty the URL field after this result
    pub fn clear_input(&self) -> bool {
        self.is_success()
    }
}

impl fmt::Display for DownloadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadResult::Success(Delivery::Saved(path)) => {
                write!(f, "File saved to {}", path.display())
            }
            DownloadResult::Success(Delivery::Buffer { filename, bytes }) => {
                write!(f, "{} is ready ({} bytes)", filename, bytes.len())
            }
            DownloadResult::AlreadyExists { .. } => {
                write!(f, "This video was already downloaded")
            }
            DownloadResult::Failure { message } => write!(f, "Download failed: {}", message),
        }
    }
}
