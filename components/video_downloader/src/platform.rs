// components/video_downloader/src/platform.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A supported social-media source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTarget {
    YouTube,
    TikTok,
    Instagram,
    Facebook,
    X,
}

impl PlatformTarget {
    /// Every platform, in classification precedence order
    pub const ALL: [PlatformTarget; 5] = [
        PlatformTarget::YouTube,
        PlatformTarget::TikTok,
        PlatformTarget::Instagram,
        PlatformTarget::Facebook,
        PlatformTarget::X,
    ];

    /// Folder name under the download root
    pub fn folder_name(&self) -> &'static str {
        match self {
            PlatformTarget::YouTube => "youtube",
            PlatformTarget::TikTok => "tiktok",
            PlatformTarget::Instagram => "instagram",
            PlatformTarget::Facebook => "facebook",
            PlatformTarget::X => "x",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformTarget::YouTube => "YouTube",
            PlatformTarget::TikTok => "TikTok",
            PlatformTarget::Instagram => "Instagram",
            PlatformTarget::Facebook => "Facebook",
            PlatformTarget::X => "X (Twitter)",
        }
    }

    /// Destination folder for this platform below `root`
    pub fn destination(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(self.folder_name())
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PlatformTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "youtube" => Ok(PlatformTarget::YouTube),
            "tiktok" => Ok(PlatformTarget::TikTok),
            "instagram" => Ok(PlatformTarget::Instagram),
            "facebook" => Ok(PlatformTarget::Facebook),
            "x" | "twitter" => Ok(PlatformTarget::X),
            _ => Err(format!("unknown platform: {}", s)),
        }
    }
}

/// Create the destination folder of every platform below `root`
pub async fn ensure_layout(root: impl AsRef<Path>) -> std::io::Result<()> {
    for platform in PlatformTarget::ALL {
        tokio::fs::create_dir_all(platform.destination(&root)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn folder_names_are_unique() {
        let mut names: Vec<_> = PlatformTarget::ALL.iter().map(|p| p.folder_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PlatformTarget::ALL.len());
    }

    #[test]
    fn parses_folder_names_back() {
        for platform in PlatformTarget::ALL {
            assert_eq!(platform.folder_name().parse::<PlatformTarget>(), Ok(platform));
        }
        assert_eq!("Twitter".parse::<PlatformTarget>(), Ok(PlatformTarget::X));
        assert!("vimeo".parse::<PlatformTarget>().is_err());
    }

    #[tokio::test]
    async fn creates_all_platform_folders() {
        let root = TempDir::new().unwrap();
        ensure_layout(root.path()).await.unwrap();

        for platform in PlatformTarget::ALL {
            let dir = platform.destination(root.path());
            assert!(dir.is_dir(), "{} was not created", dir.display());
        }
    }
}
