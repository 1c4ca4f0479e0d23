// bases/download_cli/src/app.rs
use crate::args::Args;
use crate::output::{OutputHandler, TerminalProgress};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;
use video_downloader::{
    ensure_layout, Delivery, DiskSink, DownloadError, DownloadRequest, DownloadResult,
    HistoryStore, MemorySink, OutputSink, VideoDownloader, VideoReference, YtDlp,
};

pub struct App {
    args: Args,
    output: OutputHandler,
}

impl App {
    pub fn new(args: Args) -> Self {
        let output = OutputHandler::new(args.verbose);
        Self { args, output }
    }

    pub async fn run(&self) -> Result<()> {
        if let Some(platform) = self.args.list {
            let history = HistoryStore::new(&self.args.output_dir);
            let entries = history.list(platform).await?;
            self.output.print_history(platform, &entries);
            return Ok(());
        }

        let url = self
            .args
            .url
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| eyre!("a URL is required"))?;
        let reference = VideoReference::new(url)
            .map_err(|e| DownloadError::from_classification(url, e))?;

        tracing::debug!(platform = %reference.platform(), memory = self.args.memory, "resolved link");
        let sink = self.sink().await?;
        let downloader =
            VideoDownloader::new_with_extractor(Arc::new(YtDlp::with_binary(&self.args.yt_dlp)), sink)
                .await?;

        let preview = downloader.fetch_preview(reference.url()).await;
        self.output.print_preview(preview.as_ref());
        if self.args.preview {
            return Ok(());
        }

        self.output.print_download_start(reference.url(), reference.platform());
        let request = DownloadRequest::new(reference, self.args.mode(), Some(self.args.quality()));
        let result = downloader.download(&request, &TerminalProgress::new()).await;

        if let DownloadResult::Success(Delivery::Buffer { filename, bytes }) = &result {
            tokio::fs::write(filename, bytes).await?;
        }
        self.output.print_result(&result);

        match result {
            DownloadResult::Failure { message } => Err(eyre!(message)),
            _ => Ok(()),
        }
    }

    /// Memory downloads leave the output directory untouched
    async fn sink(&self) -> Result<Arc<dyn OutputSink>> {
        if self.args.memory {
            return Ok(Arc::new(MemorySink::new()));
        }
        ensure_layout(&self.args.output_dir).await?;
        Ok(Arc::new(DiskSink::new(&self.args.output_dir)))
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}
