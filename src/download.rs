use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::config::DownloaderConfig;
use crate::error::Result;
use crate::process::ToolCommand;

/// Audio acquisition seam. The batch pipeline only ever talks to this trait;
/// the yt-dlp implementation below is the production collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download a video's audio track to `dest` as MP3.
    async fn fetch_audio(&self, video_id: &str, dest: &Path, keep_original: bool) -> Result<()>;

    /// Check the downloader binary is present and runnable.
    fn check_availability(&self) -> Result<()>;
}

/// yt-dlp based downloader.
pub struct YtDlpDownloader {
    config: DownloaderConfig,
}

impl YtDlpDownloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn fetch_audio(&self, video_id: &str, dest: &Path, keep_original: bool) -> Result<()> {
        info!("Downloading audio for video {} to {}", video_id, dest.display());

        let mut cmd = ToolCommand::new(&self.config.binary_path, "Audio download")
            .arg("--extract-audio")
            .arg("--audio-format")
            .arg("mp3");

        if keep_original {
            cmd = cmd.arg("--keep-video");
        }
        if let Some(ffmpeg_location) = &self.config.ffmpeg_location {
            cmd = cmd.arg("--ffmpeg-location").arg(ffmpeg_location);
        }

        cmd.arg("--output")
            .path(dest)
            .arg(format!("https://youtu.be/{}", video_id))
            .execute()?;

        info!("Audio download completed for video {}", video_id);
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        ToolCommand::new(&self.config.binary_path, "Downloader version check")
            .arg("--version")
            .execute()
    }
}

/// Factory for creating downloader instances
pub struct DownloaderFactory;

impl DownloaderFactory {
    pub fn create_downloader(config: DownloaderConfig) -> Box<dyn Downloader> {
        Box::new(YtDlpDownloader::new(config))
    }
}
