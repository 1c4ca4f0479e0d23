// components/video_downloader/src/progress.rs
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Delay between reporting 100% and hiding the indicator
pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_millis(300);

/// Raw progress reported by the collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Downloading { downloaded: u64, total: Option<u64> },
    Finished,
}

/// Receives percentage updates for a single download
pub trait ProgressSink: Send + Sync {
    fn set_percent(&self, percent: u8);

    /// Hide the indicator once the download is complete
    fn clear(&self);
}

/// Sink that drops every update
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_percent(&self, _percent: u8) {}
    fn clear(&self) {}
}

/// Sink that logs updates through `tracing`
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn set_percent(&self, percent: u8) {
        tracing::debug!(percent, "download progress");
    }

    fn clear(&self) {
        tracing::debug!("download progress complete");
    }
}

/// Integer percentage, `None` while the total is unknown
pub fn percent_of(downloaded: u64, total: Option<u64>) -> Option<u8> {
    match total {
        Some(total) if total > 0 => {
            let pct = (downloaded as u128 * 100 / total as u128).min(100);
            Some(pct as u8)
        }
        _ => None,
    }
}

/// Turns collaborator events into sink calls
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    hide_delay: Duration,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a dyn ProgressSink, hide_delay: Duration) -> Self {
        Self { sink, hide_delay }
    }

    pub async fn observe(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Downloading { downloaded, total } => {
                if let Some(pct) = percent_of(downloaded, total) {
                    self.sink.set_percent(pct);
                }
            }
            ProgressEvent::Finished => {
                self.sink.set_percent(100);
                tokio::time::sleep(self.hide_delay).await;
                self.sink.clear();
            }
        }
    }

    /// Forward events until the sending side is dropped
    pub async fn drive(&self, mut events: UnboundedReceiver<ProgressEvent>) {
        while let Some(event) = events.recv().await {
            self.observe(event).await;
        }
    }
}

/// Marker printed in front of every progress line we ask yt-dlp for
pub const PROGRESS_MARKER: &str = "VDL_PROGRESS";

/// `--progress-template` value understood by [`parse_progress_line`]
pub fn progress_template() -> String {
    format!(
        "download:{}|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s",
        PROGRESS_MARKER
    )
}

/// Parse one line emitted through [`progress_template`]. yt-dlp prints `NA`
/// for fields it does not know and may report byte counts as floats.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?.strip_prefix('|')?;
    let mut fields = rest.split('|');
    let status = fields.next()?;
    let downloaded = fields.next().and_then(parse_bytes);
    let total = fields.next().and_then(parse_bytes);
    let estimate = fields.next().and_then(parse_bytes);

    match status {
        "finished" => Some(ProgressEvent::Finished),
        "downloading" => Some(ProgressEvent::Downloading {
            downloaded: downloaded.unwrap_or(0),
            total: total.or(estimate),
        }),
        _ => None,
    }
}

fn parse_bytes(field: &str) -> Option<u64> {
    let field = field.trim();
    field
        .parse::<u64>()
        .ok()
        .or_else(|| field.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64))
}

#[cfg(test)]
pub mod recording {
    use super::ProgressSink;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Update {
        Percent(u8),
        Hidden,
    }

    /// Sink that remembers every call, for assertions
    #[derive(Default)]
    pub struct RecordingSink {
        updates: Mutex<Vec<Update>>,
    }

    impl RecordingSink {
        pub fn updates(&self) -> Vec<Update> {
            self.updates.lock().unwrap().clone()
        }
    }

    impl ProgressSink for RecordingSink {
        fn set_percent(&self, percent: u8) {
            self.updates.lock().unwrap().push(Update::Percent(percent));
        }

        fn clear(&self) {
            self.updates.lock().unwrap().push(Update::Hidden);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::recording::{RecordingSink, Update};
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test(start_paused = true)]
    async fn emits_percentages_then_hides() {
        let sink = RecordingSink::default();
        let tracker = ProgressTracker::new(&sink, DEFAULT_HIDE_DELAY);
        let (tx, rx) = unbounded_channel();

        tx.send(ProgressEvent::Downloading { downloaded: 50, total: Some(200) }).unwrap();
        tx.send(ProgressEvent::Downloading { downloaded: 200, total: Some(200) }).unwrap();
        tx.send(ProgressEvent::Finished).unwrap();
        drop(tx);

        tracker.drive(rx).await;

        assert_eq!(
            sink.updates(),
            vec![
                Update::Percent(25),
                Update::Percent(100),
                Update::Percent(100),
                Update::Hidden
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hides_only_after_the_delay() {
        let sink = RecordingSink::default();
        let tracker = ProgressTracker::new(&sink, DEFAULT_HIDE_DELAY);
        let start = tokio::time::Instant::now();

        tracker.observe(ProgressEvent::Finished).await;

        assert!(start.elapsed() >= DEFAULT_HIDE_DELAY);
        assert_eq!(sink.updates(), vec![Update::Percent(100), Update::Hidden]);
    }

    #[tokio::test]
    async fn unknown_total_emits_nothing() {
        let sink = RecordingSink::default();
        let tracker = ProgressTracker::new(&sink, Duration::ZERO);

        tracker
            .observe(ProgressEvent::Downloading { downloaded: 4096, total: None })
            .await;
        tracker
            .observe(ProgressEvent::Downloading { downloaded: 4096, total: Some(0) })
            .await;
        tracker
            .observe(ProgressEvent::Downloading { downloaded: 4096, total: Some(8192) })
            .await;

        assert_eq!(sink.updates(), vec![Update::Percent(50)]);
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(percent_of(300, Some(200)), Some(100));
        assert_eq!(percent_of(1, Some(3)), Some(33));
        assert_eq!(percent_of(0, Some(10)), Some(0));
    }

    #[test]
    fn parses_template_lines() {
        assert_eq!(
            parse_progress_line("VDL_PROGRESS|downloading|1024|4096|NA"),
            Some(ProgressEvent::Downloading { downloaded: 1024, total: Some(4096) })
        );
        assert_eq!(
            parse_progress_line("VDL_PROGRESS|downloading|1024|NA|2048.5"),
            Some(ProgressEvent::Downloading { downloaded: 1024, total: Some(2048) })
        );
        assert_eq!(
            parse_progress_line("VDL_PROGRESS|downloading|1024|NA|NA"),
            Some(ProgressEvent::Downloading { downloaded: 1024, total: None })
        );
        assert_eq!(
            parse_progress_line("  VDL_PROGRESS|finished|4096|4096|NA\r"),
            Some(ProgressEvent::Finished)
        );
    }

    #[test]
    fn ignores_other_output() {
        assert_eq!(parse_progress_line("[youtube] abc: Downloading webpage"), None);
        assert_eq!(parse_progress_line("VDL_PROGRESS|error|0|0|0"), None);
        assert_eq!(parse_progress_line("VDL_PROGRESS"), None);
    }

    #[test]
    fn template_carries_the_marker() {
        let template = progress_template();
        assert!(template.starts_with("download:VDL_PROGRESS|"));
        assert!(template.contains("%(progress.total_bytes_estimate)s"));
    }
}
