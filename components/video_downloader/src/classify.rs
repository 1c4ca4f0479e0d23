// components/video_downloader/src/classify.rs
//! URL validation and platform detection.
//!
//! Matching is a case-sensitive search over the raw string rather than a
//! strict URL parse, so `https://www.netflix.com/` is accepted as X because
//! it contains `x.com/`.

use crate::platform::PlatformTarget;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("URL does not belong to a supported platform")]
    Invalid,

    #[error("playlists are not supported, paste a single video URL")]
    Playlist,

    /// Passed the domain check but no platform claimed it. The domain
    /// patterns all imply one of the platform substrings.
    #[error("could not detect the platform of {0}")]
    PlatformUndetected(String),
}

static DOMAIN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(https?://)?(www\.)?(youtube\.com|youtu\.be)/",
        r"(https?://)?(www\.)?tiktok\.com/",
        r"(https?://)?(www\.)?instagram\.com/",
        r"(https?://)?(www\.)?facebook\.com/",
        r"(https?://)?(www\.)?x\.com/",
        r"(https?://)?(www\.)?twitter\.com/",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static domain pattern"))
    .collect()
});

static PLAYLIST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]list=|/playlist").expect("static playlist pattern"));

/// Substrings that map a URL to its platform, in precedence order
const PLATFORM_MARKERS: &[(PlatformTarget, &[&str])] = &[
    (PlatformTarget::YouTube, &["youtube.com", "youtu.be"]),
    (PlatformTarget::TikTok, &["tiktok.com"]),
    (PlatformTarget::Instagram, &["instagram.com"]),
    (PlatformTarget::Facebook, &["facebook.com"]),
    (PlatformTarget::X, &["x.com", "twitter.com"]),
];

pub fn is_supported(url: &str) -> bool {
    DOMAIN_PATTERNS.iter().any(|re| re.is_match(url))
}

pub fn is_playlist(url: &str) -> bool {
    PLAYLIST_PATTERN.is_match(url)
}

/// First platform whose marker appears in `url`
pub fn detect_platform(url: &str) -> Option<PlatformTarget> {
    PLATFORM_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| url.contains(m)))
        .map(|(platform, _)| *platform)
}

/// Classify a URL. Playlist rejection runs before the domain check so a
/// playlist is reported as such even on an unsupported domain.
pub fn classify(url: &str) -> Result<PlatformTarget, ClassificationError> {
    if is_playlist(url) {
        return Err(ClassificationError::Playlist);
    }
    if !is_supported(url) {
        return Err(ClassificationError::Invalid);
    }
    detect_platform(url).ok_or_else(|| ClassificationError::PlatformUndetected(url.to_string()))
}

/// A URL that passed classification, together with its platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    url: String,
    platform: PlatformTarget,
}

impl VideoReference {
    pub fn new(url: impl Into<String>) -> Result<Self, ClassificationError> {
        let url = url.into();
        let platform = classify(&url)?;
        Ok(Self { url, platform })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn platform(&self) -> PlatformTarget {
        self.platform
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("https://youtu.be/abc123", PlatformTarget::YouTube)]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", PlatformTarget::YouTube)]
    #[case("youtube.com/shorts/abc", PlatformTarget::YouTube)]
    #[case("https://www.tiktok.com/@u/video/1", PlatformTarget::TikTok)]
    #[case("https://www.instagram.com/reel/Cabc/", PlatformTarget::Instagram)]
    #[case("https://facebook.com/watch/?v=123", PlatformTarget::Facebook)]
    #[case("https://x.com/user/status/1", PlatformTarget::X)]
    #[case("https://twitter.com/user/status/1", PlatformTarget::X)]
    fn classifies_supported_urls(#[case] url: &str, #[case] expected: PlatformTarget) {
        assert_eq!(classify(url), Ok(expected));
    }

    #[rstest]
    #[case("https://vimeo.com/123")]
    #[case("")]
    #[case("not a url")]
    #[case("https://www.dailymotion.com/video/x7")]
    #[case("https://YOUTUBE.COM/watch?v=x")]
    #[case("https://youtube.com")]
    fn rejects_unsupported_urls(#[case] url: &str) {
        assert_eq!(classify(url), Err(ClassificationError::Invalid));
    }

    #[rstest]
    #[case("https://youtube.com/watch?v=x&list=PL1")]
    #[case("https://www.youtube.com/playlist?list=PL1")]
    #[case("https://youtube.com/watch?list=PL1")]
    #[case("https://vimeo.com/playlist/9")]
    #[case("https://example.com/?list=abc")]
    fn rejects_playlists_regardless_of_domain(#[case] url: &str) {
        assert_eq!(classify(url), Err(ClassificationError::Playlist));
    }

    #[test]
    fn ambiguous_urls_resolve_by_precedence() {
        // Valid through the TikTok pattern, but YouTube's marker wins
        assert_eq!(
            classify("https://www.tiktok.com/@u/video/1?from=youtube.com"),
            Ok(PlatformTarget::YouTube)
        );
        assert_eq!(
            classify("https://www.facebook.com/share?u=instagram.com"),
            Ok(PlatformTarget::Instagram)
        );
    }

    #[test]
    fn substring_matching_is_not_a_url_parse() {
        assert_eq!(classify("https://www.netflix.com/title/1"), Ok(PlatformTarget::X));
    }

    #[test]
    fn video_reference_keeps_url_and_platform() {
        let reference = VideoReference::new("https://youtu.be/abc123").unwrap();
        assert_eq!(reference.url(), "https://youtu.be/abc123");
        assert_eq!(reference.platform(), PlatformTarget::YouTube);

        assert_matches!(
            VideoReference::new("https://vimeo.com/123"),
            Err(ClassificationError::Invalid)
        );
    }
}
