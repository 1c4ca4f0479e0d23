// components/video_downloader/src/options.rs
use crate::types::{DownloadMode, DownloadRequest, Quality};
use std::path::{Path, PathBuf};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Bitrate used for every audio-only download
pub const AUDIO_BITRATE_KBPS: u32 = 192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    ExtractAudio { codec: String, bitrate_kbps: u32 },
}

/// Everything the collaborator needs to perform one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// Output path template, `%(field)s` placeholders allowed
    pub output_template: PathBuf,
    pub quiet: bool,
    pub no_warnings: bool,
    pub no_playlist: bool,
    pub format: String,
    pub post_processor: Option<PostProcessor>,
    pub headers: Vec<(String, String)>,
}

impl ExtractorOptions {
    /// Options for `request`, writing into `dir`. `stem` is the predicted
    /// file stem; without one the collaborator names the file from the title.
    pub fn for_request(
        request: &DownloadRequest,
        dir: &Path,
        stem: Option<&str>,
        user_agent: &str,
    ) -> Self {
        let name = match stem {
            Some(stem) => format!("{}.%(ext)s", escape_template(stem)),
            None => "%(title)s.%(ext)s".to_string(),
        };

        let post_processor = match request.mode() {
            DownloadMode::AudioOnly => Some(PostProcessor::ExtractAudio {
                codec: "mp3".to_string(),
                bitrate_kbps: AUDIO_BITRATE_KBPS,
            }),
            DownloadMode::Video => None,
        };

        Self {
            output_template: dir.join(name),
            quiet: true,
            no_warnings: true,
            no_playlist: true,
            format: format_selector(request.mode(), request.quality()).to_string(),
            post_processor,
            headers: vec![("User-Agent".to_string(), user_agent.to_string())],
        }
    }
}

/// Format selector for a mode and quality.
///
/// `Medium360p` picks the *worst* stream at or below 360p, which is the
/// long-standing behaviour of the form. `best[height<=360]` would be the
/// better reading of "medium".
pub fn format_selector(mode: DownloadMode, quality: Option<Quality>) -> &'static str {
    match (mode, quality) {
        (DownloadMode::AudioOnly, _) => "best",
        (DownloadMode::Video, Some(Quality::Medium360p)) => "worst[height<=360]",
        (DownloadMode::Video, _) => "best",
    }
}

/// Replace path separators so a title can be used as a file name
pub fn sanitize_title(title: &str) -> String {
    title.trim().replace(['/', '\\'], "_")
}

/// `<sanitized title>.<ext>` for the given mode
pub fn predicted_filename(title: Option<&str>, mode: DownloadMode) -> String {
    let title = title.map(sanitize_title).filter(|t| !t.is_empty());
    format!(
        "{}.{}",
        title.as_deref().unwrap_or("video"),
        mode.extension()
    )
}

fn escape_template(s: &str) -> String {
    s.replace('%', "%%")
}
