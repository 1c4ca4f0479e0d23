// bases/download_cli/src/args.rs
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use video_downloader::{DownloadMode, PlatformTarget, Quality};

/// Download videos or extract their audio from social platforms
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Root directory holding one folder per platform
    #[arg(short, long, default_value = "downloads")]
    pub output_dir: PathBuf,

    /// URL of a single video
    #[arg(required_unless_present = "list")]
    pub url: Option<String>,

    /// Extract the audio track as mp3 instead of keeping the video
    #[arg(short, long)]
    pub audio: bool,

    /// Video quality, ignored with --audio
    #[arg(short, long, value_enum, default_value_t = QualityArg::High)]
    pub quality: QualityArg,

    /// Only show the title, thumbnail and duration
    #[arg(short, long)]
    pub preview: bool,

    /// Download into memory and write the file to the current directory
    /// instead of the platform folder
    #[arg(long)]
    pub memory: bool,

    /// List previous downloads of a platform
    #[arg(short, long, value_name = "PLATFORM")]
    pub list: Option<PlatformTarget>,

    /// yt-dlp executable
    #[arg(long, default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityArg {
    High,
    Medium,
}

impl Args {
    pub fn mode(&self) -> DownloadMode {
        if self.audio {
            DownloadMode::AudioOnly
        } else {
            DownloadMode::Video
        }
    }

    pub fn quality(&self) -> Quality {
        match self.quality {
            QualityArg::High => Quality::High,
            QualityArg::Medium => Quality::Medium360p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_to_high_quality_video() {
        let args = Args::parse_from(["download-cli", "https://youtu.be/abc"]);
        assert_eq!(args.mode(), DownloadMode::Video);
        assert_eq!(args.quality(), Quality::High);
        assert_eq!(args.output_dir, PathBuf::from("downloads"));
        assert!(!args.memory);
    }

    #[rstest]
    #[case(&["download-cli", "-a", "https://youtu.be/abc"], DownloadMode::AudioOnly)]
    #[case(&["download-cli", "--quality", "medium", "https://youtu.be/abc"], DownloadMode::Video)]
    fn parses_mode(#[case] argv: &[&str], #[case] expected: DownloadMode) {
        let args = Args::parse_from(argv);
        assert_eq!(args.mode(), expected);
    }

    #[test]
    fn list_does_not_need_a_url() {
        let args = Args::parse_from(["download-cli", "--list", "tiktok"]);
        assert_eq!(args.list, Some(PlatformTarget::TikTok));
        assert_eq!(args.url, None);
    }

    #[test]
    fn url_is_required_otherwise() {
        assert!(Args::try_parse_from(["download-cli"]).is_err());
    }
}
