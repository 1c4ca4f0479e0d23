// bases/download_web/src/forms.rs
use serde::Deserialize;
use video_downloader::{DownloadError, DownloadMode, DownloadRequest, Quality, VideoReference};

/// URL field submitted for a preview
#[derive(Debug, Deserialize)]
pub struct UrlForm {
    pub url: String,
}

/// Download form submission, also accepted as a query string
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadForm {
    pub url: String,
    pub mode: String,
    #[serde(default)]
    pub quality: Option<String>,
}

impl DownloadForm {
    /// Classify the URL and build a request from the selections
    pub fn to_request(&self) -> Result<DownloadRequest, FormError> {
        let url = self.url.trim();
        let reference = VideoReference::new(url)
            .map_err(|e| FormError::Rejected(DownloadError::from_classification(url, e)))?;
        let mode = self.mode.parse::<DownloadMode>().map_err(FormError::Invalid)?;
        let quality = match (mode, self.quality.as_deref()) {
            (DownloadMode::Video, Some(q)) if !q.is_empty() => {
                Some(q.parse::<Quality>().map_err(FormError::Invalid)?)
            }
            _ => None,
        };
        Ok(DownloadRequest::new(reference, mode, quality))
    }
}

#[derive(Debug)]
pub enum FormError {
    /// The URL failed classification
    Rejected(DownloadError),
    /// A select or radio carried a value the form never offers
    Invalid(String),
}

impl FormError {
    /// Message shown in the result banner
    pub fn message(&self) -> String {
        match self {
            FormError::Rejected(DownloadError::InvalidUrl(_)) => {
                "Invalid link. Paste a YouTube, TikTok, Instagram, Facebook or X video URL.".to_string()
            }
            FormError::Rejected(DownloadError::PlaylistRejected(_)) => {
                "Playlists are not supported. Paste the link of a single video.".to_string()
            }
            FormError::Rejected(other) => other.to_string(),
            FormError::Invalid(message) => message.clone(),
        }
    }
}
