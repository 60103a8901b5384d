use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::{ChannelConfig, Config};
use crate::error::{Result, TubescribeError};
use crate::index::{self, INDEX_FILE_NAME};
use crate::listing::ChannelLister;
use crate::pipeline::{MediaPipeline, VideoTask};
use crate::slug::{extract_video_id, normalize_title};

/// Batch driver: walks configured channels in order and runs the media
/// pipeline for every indexed video that has no subtitles yet. Strictly
/// sequential; the first tool failure aborts the whole batch.
pub struct Workflow {
    config: Config,
    lister: ChannelLister,
    pipeline: MediaPipeline,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let lister = ChannelLister::new(&config.downloader);
        let pipeline = MediaPipeline::from_config(&config)?;

        // Fail before any listing work if the external tools are missing
        pipeline.check_availability()?;

        Ok(Self {
            config,
            lister,
            pipeline,
        })
    }

    /// Process every configured channel in configuration order.
    pub async fn run_all(&self) -> Result<()> {
        if self.config.channels.is_empty() {
            warn!("No channels configured; nothing to do");
            return Ok(());
        }

        for channel in &self.config.channels {
            self.run_channel(channel).await?;
        }

        Ok(())
    }

    pub async fn run_channel_by_name(&self, name: &str) -> Result<()> {
        let channel = self.config.channel_by_name(name).ok_or_else(|| {
            TubescribeError::Config(format!("No configured channel named '{}'", name))
        })?;
        self.run_channel(channel).await
    }

    pub async fn run_channel(&self, channel: &ChannelConfig) -> Result<()> {
        info!("Processing channel '{}'", channel.channel_name);

        let workdir = self.config.output_dir.join(&channel.channel_name);
        fs::create_dir_all(&workdir).await?;

        let index_path = workdir.join(INDEX_FILE_NAME);
        if channel.refresh_channel_videos || !index_path.is_file() {
            self.lister.refresh(channel, &index_path).await?;
        }

        let videos = index::read_index(&index_path)?;
        if videos.is_empty() {
            // A truncated index reads the same as an empty channel
            warn!(
                "Index for channel '{}' is empty; treating as zero videos",
                channel.channel_name
            );
            return Ok(());
        }

        for (video_id, title) in &videos {
            let slug = normalize_title(title);
            let subtitle_path = workdir.join(format!("{}.srt", slug));
            if subtitle_path.is_file() {
                debug!("Subtitles for video {} already exist, skipping", video_id);
                continue;
            }

            info!("Generating subtitles for video ID: {}, Title: {}", video_id, slug);
            let task = VideoTask {
                video_id,
                slug: &slug,
                language: &channel.language,
                workdir: &workdir,
                keep_original: channel.keep_original,
                keep_mp3: channel.keep_mp3,
                keep_wav: channel.keep_wav,
            };
            self.pipeline.run(&task).await?;
        }

        info!("Channel '{}' completed", channel.channel_name);
        Ok(())
    }

    /// Refresh a single channel's index without processing any videos.
    pub async fn refresh_channel(&self, name: &str) -> Result<usize> {
        let channel = self.config.channel_by_name(name).ok_or_else(|| {
            TubescribeError::Config(format!("No configured channel named '{}'", name))
        })?;

        let workdir = self.config.output_dir.join(&channel.channel_name);
        fs::create_dir_all(&workdir).await?;

        self.lister
            .refresh(channel, &workdir.join(INDEX_FILE_NAME))
            .await
    }

    /// Direct-URL entry point: generate subtitles for one video outside any
    /// channel index. Intermediate artifacts are kept for inspection.
    pub async fn run_single_video(
        &self,
        url: &str,
        language: &str,
        title: Option<&str>,
        output_dir: &Path,
        keep_original: bool,
    ) -> Result<PathBuf> {
        let video_id = extract_video_id(url)?;
        let slug = match title {
            Some(title) => normalize_title(title),
            None => video_id.clone(),
        };

        fs::create_dir_all(output_dir).await?;

        let task = VideoTask {
            video_id: &video_id,
            slug: &slug,
            language,
            workdir: output_dir,
            keep_original,
            keep_mp3: true,
            keep_wav: true,
        };
        self.pipeline.run(&task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MockDownloader;
    use crate::index::VideoEntry;
    use crate::recognize::MockRecognizer;
    use crate::transcode::MockTranscoder;

    fn silent_pipeline() -> MediaPipeline {
        // No expectations: any tool invocation fails the test
        MediaPipeline::with_tools(
            Box::new(MockDownloader::new()),
            Box::new(MockTranscoder::new()),
            Box::new(MockRecognizer::new()),
        )
    }

    fn test_workflow(output_dir: PathBuf, channel: ChannelConfig) -> Workflow {
        let mut config = Config::default();
        config.output_dir = output_dir;
        config.channels.push(channel);

        let lister = ChannelLister::new(&config.downloader);
        Workflow {
            config,
            lister,
            pipeline: silent_pipeline(),
        }
    }

    fn test_channel() -> ChannelConfig {
        ChannelConfig {
            channel_name: "ren".to_string(),
            channel_id: Some("UCxyz".to_string()),
            playlist_id: None,
            language: "en".to_string(),
            refresh_channel_videos: false,
            keep_original: false,
            keep_mp3: false,
            keep_wav: false,
        }
    }

    #[tokio::test]
    async fn test_channel_with_all_subtitles_present_invokes_no_tools() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("ren");
        std::fs::create_dir_all(&workdir).unwrap();

        let entries = vec![
            VideoEntry {
                video_id: "abc123".to_string(),
                title: "Hello World | Part 2!".to_string(),
            },
            VideoEntry {
                video_id: "def456".to_string(),
                title: "Second Video".to_string(),
            },
        ];
        index::write_index(workdir.join(INDEX_FILE_NAME), &entries).unwrap();

        // Subtitle artifacts named by slug mark both videos as done
        std::fs::write(workdir.join("hello_world-part_2.srt"), b"stub").unwrap();
        std::fs::write(workdir.join("second_video.srt"), b"stub").unwrap();

        let workflow = test_workflow(dir.path().to_path_buf(), test_channel());
        workflow.run_channel(&workflow.config.channels[0]).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_index_treated_as_zero_videos() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("ren");
        std::fs::create_dir_all(&workdir).unwrap();
        std::fs::write(workdir.join(INDEX_FILE_NAME), "").unwrap();

        let workflow = test_workflow(dir.path().to_path_buf(), test_channel());
        workflow.run_channel(&workflow.config.channels[0]).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_channel_name_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = test_workflow(dir.path().to_path_buf(), test_channel());

        let err = workflow.run_channel_by_name("nope").await.unwrap_err();
        assert!(matches!(err, TubescribeError::Config(_)));
    }
}
