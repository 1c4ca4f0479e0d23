// bases/download_cli/src/output.rs
use indicatif::{ProgressBar, ProgressStyle};
use video_downloader::{
    Delivery, DownloadResult, HistoryEntry, PlatformTarget, PreviewInfo, ProgressSink,
};

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_download_start(&self, url: &str, platform: PlatformTarget) {
        println!("Starting {} download from: {}", platform, url);
    }

    pub fn print_preview(&self, preview: Option<&PreviewInfo>) {
        let Some(preview) = preview else {
            println!("No preview available");
            return;
        };
        println!("Title: {}", preview.title);
        if let Some(duration) = preview.duration_label() {
            println!("Duration: {}", duration);
        }
        if self.verbose && !preview.thumbnail_url.is_empty() {
            println!("Thumbnail: {}", preview.thumbnail_url);
        }
    }

    pub fn print_result(&self, result: &DownloadResult) {
        match result {
            DownloadResult::Success(Delivery::Saved(path)) => {
                println!("Saved to {}", path.display());
            }
            DownloadResult::Success(Delivery::Buffer { filename, bytes }) => {
                println!("Wrote {} ({} bytes)", filename, bytes.len());
            }
            DownloadResult::AlreadyExists { path } => {
                println!("Already downloaded: {}", path.display());
            }
            DownloadResult::Failure { message } => {
                eprintln!("Download failed: {}", message);
            }
        }
    }

    pub fn print_history(&self, platform: PlatformTarget, entries: &[HistoryEntry]) {
        if entries.is_empty() {
            println!("No downloads yet for {}", platform);
            return;
        }
        println!("Downloaded from {}:", platform);
        for entry in entries {
            if self.verbose {
                let link = entry.file_url().unwrap_or_else(|| entry.path.display().to_string());
                println!("  {}  {}", entry.filename, link);
            } else {
                println!("  {}", entry.filename);
            }
        }
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}

/// Percentage bar on stderr
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::with_template("[{bar:30.cyan/blue}] {pos:>3}%") {
            bar.set_style(style.progress_chars("#> "));
        }
        Self::with_bar(bar)
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn set_percent(&self, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}
