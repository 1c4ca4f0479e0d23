// bases/download_web/src/events.rs
//! Progress of a running download, relayed to the browser as
//! Server-Sent Events.

use axum::response::sse::Event;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use video_downloader::{Delivery, DownloadResult, ProgressSink};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoneEvent {
    /// `success`, `exists`, `failure` or `rejected`
    pub status: &'static str,
    pub message: String,
    /// Platform folder of a saved file
    pub platform: Option<&'static str>,
    pub filename: Option<String>,
    /// Link the browser follows to fetch an in-memory download
    pub delivery_url: Option<String>,
    pub clear_input: bool,
}

impl DoneEvent {
    pub fn rejected(message: String) -> Self {
        Self {
            status: "rejected",
            message,
            platform: None,
            filename: None,
            delivery_url: None,
            clear_input: false,
        }
    }

    /// Summarise a result. `delivery_id` is set when the bytes were parked
    /// for the browser.
    pub fn from_result(
        result: &DownloadResult,
        platform: &'static str,
        delivery_id: Option<u64>,
    ) -> Self {
        let status = match result {
            DownloadResult::Success(_) => "success",
            DownloadResult::AlreadyExists { .. } => "exists",
            DownloadResult::Failure { .. } => "failure",
        };
        let (filename, platform) = match result {
            DownloadResult::Success(delivery @ Delivery::Saved(_)) => {
                (Some(delivery.filename()), Some(platform))
            }
            DownloadResult::Success(Delivery::Buffer { filename, .. }) => {
                (Some(filename.clone()), None)
            }
            _ => (None, None),
        };
        Self {
            status,
            message: result.to_string(),
            platform,
            filename,
            delivery_url: delivery_id.map(|id| format!("/deliveries/{}", id)),
            clear_input: result.clear_input(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Percent(u8),
    Hide,
    Done(DoneEvent),
}

impl UiEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UiEvent::Done(_))
    }

    pub fn into_sse(self) -> Event {
        match self {
            UiEvent::Percent(pct) => Event::default().event("progress").data(pct.to_string()),
            UiEvent::Hide => Event::default().event("hide").data(""),
            UiEvent::Done(done) => Event::default()
                .event("done")
                .data(serde_json::to_string(&done).unwrap_or_else(|_| "{}".to_string())),
        }
    }
}

/// Forwards progress into the event channel of one request
pub struct ChannelProgress {
    tx: UnboundedSender<UiEvent>,
}

impl ChannelProgress {
    pub fn new(tx: UnboundedSender<UiEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgress {
    fn set_percent(&self, percent: u8) {
        let _ = self.tx.send(UiEvent::Percent(percent));
    }

    fn clear(&self) {
        let _ = self.tx.send(UiEvent::Hide);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn forwards_progress_into_the_channel() {
        let (tx, mut rx) = unbounded_channel();
        let progress = ChannelProgress::new(tx);

        progress.set_percent(25);
        progress.set_percent(100);
        progress.clear();

        assert_eq!(rx.try_recv().unwrap(), UiEvent::Percent(25));
        assert_eq!(rx.try_recv().unwrap(), UiEvent::Percent(100));
        assert_eq!(rx.try_recv().unwrap(), UiEvent::Hide);
    }

    #[test]
    fn saved_files_report_their_folder() {
        let result = DownloadResult::Success(Delivery::Saved(PathBuf::from(
            "downloads/youtube/My Video.mp4",
        )));
        let done = DoneEvent::from_result(&result, "youtube", None);

        assert_eq!(done.status, "success");
        assert_eq!(done.platform, Some("youtube"));
        assert_eq!(done.filename.as_deref(), Some("My Video.mp4"));
        assert!(done.clear_input);
        assert_eq!(done.delivery_url, None);
    }

    #[test]
    fn buffers_carry_a_delivery_link() {
        let result = DownloadResult::Success(Delivery::Buffer {
            filename: "Song.mp3".to_string(),
            bytes: vec![1, 2, 3],
        });
        let done = DoneEvent::from_result(&result, "tiktok", Some(4));

        assert_eq!(done.delivery_url.as_deref(), Some("/deliveries/4"));
        assert_eq!(done.platform, None);
    }

    #[test]
    fn failures_keep_the_form() {
        let result = DownloadResult::Failure {
            message: "ERROR: Video unavailable".to_string(),
        };
        let done = DoneEvent::from_result(&result, "youtube", None);

        assert_eq!(done.status, "failure");
        assert!(done.message.contains("ERROR: Video unavailable"));
        assert!(!done.clear_input);
    }

    #[test]
    fn duplicates_are_reported_as_exists() {
        let result = DownloadResult::AlreadyExists {
            path: PathBuf::from("downloads/x/a.mp4"),
        };
        assert_eq!(DoneEvent::from_result(&result, "x", None).status, "exists");
    }

    #[test]
    fn only_done_ends_the_stream() {
        assert!(UiEvent::Done(DoneEvent::rejected("no".into())).is_terminal());
        assert!(!UiEvent::Percent(3).is_terminal());
        assert!(!UiEvent::Hide.is_terminal());
    }
}
