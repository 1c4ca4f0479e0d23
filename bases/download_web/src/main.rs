// bases/download_web/src/main.rs
use clap::Parser;
use color_eyre::Result;
use std::sync::Arc;
use video_downloader::{DiskSink, MemorySink, OutputSink, VideoDownloader, YtDlp};

mod config;
mod deliveries;
mod error;
mod events;
mod forms;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "download_web=info,video_downloader=info,tower_http=info".into()),
        )
        .init();

    // Parse CLI arguments
    let args = config::CliArgs::parse();
    let config = config::Config::from_args(args);

    let sink: Arc<dyn OutputSink> = match config.delivery {
        config::DeliveryMode::Disk => {
            video_downloader::ensure_layout(&config.download_dir).await?;
            Arc::new(DiskSink::new(&config.download_dir))
        }
        config::DeliveryMode::Memory => Arc::new(MemorySink::new()),
    };

    let downloader =
        VideoDownloader::new_with_extractor(Arc::new(YtDlp::with_binary(&config.yt_dlp)), sink)
            .await?
            .with_settings(config.settings.clone());

    server::run(server::AppState::new(config, downloader)).await?;

    Ok(())
}
