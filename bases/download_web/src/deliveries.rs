// bases/download_web/src/deliveries.rs
//! In-memory downloads waiting to be fetched by the browser.
//!
//! Each buffer can be claimed once and is dropped after [`DELIVERY_TTL`]
//! if nobody claims it.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DELIVERY_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct Deliveries {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, PendingFile>>,
}

impl Deliveries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a file and schedule its removal
    pub async fn register(self: &Arc<Self>, file: PendingFile) -> u64 {
        self.register_with_ttl(file, DELIVERY_TTL).await
    }

    pub async fn register_with_ttl(self: &Arc<Self>, file: PendingFile, ttl: Duration) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.pending.lock().await.insert(id, file);

        let deliveries = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if deliveries.pending.lock().await.remove(&id).is_some() {
                tracing::debug!(id, "unclaimed download expired");
            }
        });
        id
    }

    /// Take a file out, it cannot be claimed twice
    pub async fn claim(&self, id: u64) -> Option<PendingFile> {
        self.pending.lock().await.remove(&id)
    }
}

impl IntoResponse for PendingFile {
    fn into_response(self) -> Response {
        let headers = [
            (header::CONTENT_TYPE, content_type(&self.filename).to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&self.filename)),
        ];
        (headers, self.bytes).into_response()
    }
}

fn content_type(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp3" => "audio/mpeg",
        Some(ext) if ext == "mp4" => "video/mp4",
        Some(ext) if ext == "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

/// `attachment` header with an ASCII fallback and the UTF-8 name
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> PendingFile {
        PendingFile {
            filename: name.to_string(),
            bytes: b"data".to_vec(),
        }
    }

    #[tokio::test]
    async fn files_can_be_claimed_once() {
        let deliveries = Arc::new(Deliveries::new());
        let id = deliveries.register(file("a.mp4")).await;

        assert_eq!(deliveries.claim(id).await, Some(file("a.mp4")));
        assert_eq!(deliveries.claim(id).await, None);
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let deliveries = Arc::new(Deliveries::new());
        let a = deliveries.register(file("a.mp4")).await;
        let b = deliveries.register(file("b.mp4")).await;
        assert_ne!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn unclaimed_files_expire() {
        let deliveries = Arc::new(Deliveries::new());
        let id = deliveries
            .register_with_ttl(file("a.mp4"), Duration::from_secs(5))
            .await;

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(deliveries.claim(id).await, None);
    }

    #[test]
    fn headers_describe_the_file() {
        assert_eq!(content_type("Song.MP3"), "audio/mpeg");
        assert_eq!(content_type("clip.mp4"), "video/mp4");
        assert_eq!(content_type("noext"), "application/octet-stream");
        assert_eq!(
            content_disposition("Café \"live\".mp3"),
            "attachment; filename=\"Caf_ _live_.mp3\"; filename*=UTF-8''Caf%C3%A9%20%22live%22.mp3"
        );
    }
}
