// components/video_downloader/src/ytdlp.rs
use crate::options::{ExtractorOptions, PostProcessor};
use crate::progress::{parse_progress_line, progress_template, ProgressEvent};
use crate::types::{ExtractError, MediaInfo};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// The external media-extraction collaborator
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Check if the extractor is available and has all required dependencies
    async fn check_available(&self) -> Result<(), ExtractError>;

    /// Fetch metadata about a video without downloading it
    async fn extract_info(&self, url: &str) -> Result<MediaInfo, ExtractError>;

    /// Download `url` and return the path of the produced file. Progress is
    /// sent on `progress` while the download runs.
    async fn download(
        &self,
        url: &str,
        options: &ExtractorOptions,
        progress: UnboundedSender<ProgressEvent>,
    ) -> Result<PathBuf, ExtractError>;
}

const FILEPATH_MARKER: &str = "VDL_FILEPATH|";

/// yt-dlp driven as a child process
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new() -> Self {
        Self::with_binary("yt-dlp")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Command line for a download, without the binary
    pub fn download_args(url: &str, options: &ExtractorOptions) -> Vec<String> {
        let mut args = Vec::new();
        if options.quiet {
            args.push("--quiet".to_string());
        }
        if options.no_warnings {
            args.push("--no-warnings".to_string());
        }
        if options.no_playlist {
            args.push("--no-playlist".to_string());
        }
        // --quiet would otherwise swallow the progress lines
        args.extend([
            "--newline".to_string(),
            "--progress".to_string(),
            "--progress-template".to_string(),
            progress_template(),
            "--print".to_string(),
            format!("after_move:{}%(filepath)s", FILEPATH_MARKER),
            "-f".to_string(),
            options.format.clone(),
        ]);

        if let Some(PostProcessor::ExtractAudio { codec, bitrate_kbps }) = &options.post_processor {
            args.extend([
                "-x".to_string(),
                "--audio-format".to_string(),
                codec.clone(),
                "--audio-quality".to_string(),
                format!("{}K", bitrate_kbps),
            ]);
        }

        for (name, value) in &options.headers {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }

        args.push("-o".to_string());
        args.push(options.output_template.to_string_lossy().into_owned());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn check_available(&self) -> Result<(), ExtractError> {
        which::which(&self.binary)
            .map(|_| ())
            .map_err(|_| ExtractError::DependencyNotFound(self.binary.display().to_string()))
    }

    async fn extract_info(&self, url: &str) -> Result<MediaInfo, ExtractError> {
        let output = Command::new(&self.binary)
            .args(["--dump-json", "--no-download", "--no-playlist", "--quiet", "--no-warnings", "--"])
            .arg(url)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Failed(error_message(&stderr, &output.status.to_string())));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| ExtractError::Output(e.to_string()))
    }

    async fn download(
        &self,
        url: &str,
        options: &ExtractorOptions,
        progress: UnboundedSender<ProgressEvent>,
    ) -> Result<PathBuf, ExtractError> {
        let args = Self::download_args(url, options);
        debug!(binary = %self.binary.display(), ?args, "starting yt-dlp");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExtractError::Output("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExtractError::Output("stderr was not captured".to_string()))?;

        // Progress may land on either stream depending on the yt-dlp version
        let stderr_progress = progress.clone();
        let stderr_task = tokio::spawn(async move {
            let mut collected = String::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match parse_progress_line(&line) {
                    Some(event) => {
                        let _ = stderr_progress.send(event);
                    }
                    None => {
                        collected.push_str(&line);
                        collected.push('\n');
                    }
                }
            }
            collected
        });

        let mut produced = None;
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(event) = parse_progress_line(&line) {
                let _ = progress.send(event);
            } else if let Some(path) = line.trim_end().strip_prefix(FILEPATH_MARKER) {
                produced = Some(PathBuf::from(path));
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(ExtractError::Failed(error_message(
                &stderr,
                &format!("yt-dlp exited with status: {}", status),
            )));
        }

        produced.ok_or_else(|| ExtractError::Output("yt-dlp did not report an output file".to_string()))
    }
}

/// The `ERROR:` lines of yt-dlp's stderr, or all of it, or `fallback`
fn error_message(stderr: &str, fallback: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();

    if !errors.is_empty() {
        errors.join("\n")
    } else if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        fallback.to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::VideoReference;
    use crate::options::DEFAULT_USER_AGENT;
    use crate::types::{DownloadRequest, Quality};
    use std::path::Path;

    fn args_for(request: &DownloadRequest) -> Vec<String> {
        let options =
            ExtractorOptions::for_request(request, Path::new("/dl/youtube"), None, DEFAULT_USER_AGENT);
        YtDlp::download_args(request.url(), &options)
    }

    fn reference() -> VideoReference {
        VideoReference::new("https://youtu.be/abc123").unwrap()
    }

    #[test]
    fn audio_args_extract_mp3() {
        let args = args_for(&DownloadRequest::audio_only(reference()));
        let joined = args.join(" ");
        assert!(joined.contains("-f best"), "{}", joined);
        assert!(joined.contains("-x --audio-format mp3 --audio-quality 192K"), "{}", joined);
    }

    #[test]
    fn video_args_are_single_video_with_user_agent() {
        let args = args_for(&DownloadRequest::video(reference(), Quality::Medium360p));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"worst[height<=360]".to_string()));
        assert!(!args.contains(&"-x".to_string()));

        let header = args.iter().position(|a| a == "--add-header").unwrap();
        assert!(args[header + 1].starts_with("User-Agent:Mozilla/5.0"));
    }

    #[test]
    fn url_comes_last_after_separator() {
        let args = args_for(&DownloadRequest::video(reference(), Quality::High));
        assert_eq!(&args[args.len() - 2..], ["--", "https://youtu.be/abc123"]);
        let output = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[output + 1], "/dl/youtube/%(title)s.%(ext)s");
    }

    #[test]
    fn error_message_prefers_error_lines() {
        let stderr = "WARNING: something\nERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(error_message(stderr, "exit 1"), "ERROR: [youtube] abc: Video unavailable");
        assert_eq!(error_message("  plain failure \n", "exit 1"), "plain failure");
        assert_eq!(error_message("", "exit 1"), "exit 1");
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let extractor = YtDlp::with_binary("definitely-not-a-real-yt-dlp-binary");
        let result = extractor.check_available().await;
        assert!(matches!(result, Err(ExtractError::DependencyNotFound(_))));
    }
}
