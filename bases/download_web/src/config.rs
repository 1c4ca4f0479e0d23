// bases/download_web/src/config.rs
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use video_downloader::{DownloadSettings, DEFAULT_USER_AGENT};

/// Where finished downloads go
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Keep files in the per-platform folders
    Disk,
    /// Send files to the browser and keep nothing on the server
    Memory,
}

/// Web server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Root holding one folder per platform
    pub download_dir: PathBuf,

    pub delivery: DeliveryMode,

    pub yt_dlp: PathBuf,

    pub settings: DownloadSettings,
}

/// Social video downloader - web form
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Root directory for downloads
    #[arg(short, long, default_value = "downloads")]
    pub download_dir: PathBuf,

    /// Keep files on disk or hand them straight to the browser
    #[arg(long, value_enum, default_value_t = DeliveryMode::Disk)]
    pub delivery: DeliveryMode,

    /// yt-dlp executable
    #[arg(long, default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,

    /// User-Agent sent to the platforms
    #[arg(long)]
    pub user_agent: Option<String>,

    /// How long the finished progress bar stays visible
    #[arg(long, default_value_t = 300)]
    pub hide_delay_ms: u64,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Self {
        let settings = DownloadSettings {
            user_agent: args.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            hide_delay: Duration::from_millis(args.hide_delay_ms),
        };

        Self {
            port: args.port,
            download_dir: args.download_dir,
            delivery: args.delivery,
            yt_dlp: args.yt_dlp,
            settings,
        }
    }

    /// Whether downloads are kept and listed
    pub fn keeps_files(&self) -> bool {
        self.delivery == DeliveryMode::Disk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_disk_delivery() {
        let config = Config::from_args(CliArgs::parse_from(["download-web"]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.delivery, DeliveryMode::Disk);
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.settings.hide_delay, Duration::from_millis(300));
        assert_eq!(config.settings.user_agent, DEFAULT_USER_AGENT);
        assert!(config.keeps_files());
    }

    #[test]
    fn memory_delivery_keeps_nothing() {
        let config =
            Config::from_args(CliArgs::parse_from(["download-web", "--delivery", "memory"]));
        assert_eq!(config.delivery, DeliveryMode::Memory);
        assert!(!config.keeps_files());
    }

    #[test]
    fn custom_values_override_defaults() {
        let config = Config::from_args(CliArgs::parse_from([
            "download-web",
            "--port",
            "3000",
            "--user-agent",
            "Agent/2",
            "--hide-delay-ms",
            "0",
        ]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.settings.user_agent, "Agent/2");
        assert_eq!(config.settings.hide_delay, Duration::ZERO);
    }
}
