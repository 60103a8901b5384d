use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::download::{Downloader, DownloaderFactory};
use crate::error::{Result, TubescribeError};
use crate::recognize::{Recognizer, RecognizerFactory};
use crate::transcode::{Transcoder, TranscoderFactory};

/// One video's worth of pipeline input: identity, artifact naming, and the
/// channel's retention policy.
#[derive(Debug, Clone)]
pub struct VideoTask<'a> {
    pub video_id: &'a str,
    pub slug: &'a str,
    pub language: &'a str,
    pub workdir: &'a Path,
    pub keep_original: bool,
    pub keep_mp3: bool,
    pub keep_wav: bool,
}

impl VideoTask<'_> {
    pub fn audio_path(&self) -> PathBuf {
        self.workdir.join(format!("{}.mp3", self.slug))
    }

    pub fn waveform_path(&self) -> PathBuf {
        self.workdir.join(format!("{}.wav", self.slug))
    }

    pub fn subtitle_path(&self) -> PathBuf {
        self.workdir.join(format!("{}.srt", self.slug))
    }

    /// Output base the recognizer appends `.srt` to.
    pub fn output_base(&self) -> PathBuf {
        self.workdir.join(self.slug)
    }
}

/// Three-stage pipeline over external tools: acquire audio, transcode to a
/// waveform, transcribe to subtitles. Each stage is gated by the existence
/// of its target artifact, so an interrupted run resumes where it stopped.
pub struct MediaPipeline {
    downloader: Box<dyn Downloader>,
    transcoder: Box<dyn Transcoder>,
    recognizer: Box<dyn Recognizer>,
}

impl MediaPipeline {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_tools(
            DownloaderFactory::create_downloader(config.downloader.clone()),
            TranscoderFactory::create_transcoder(config.transcoder.clone()),
            RecognizerFactory::create_recognizer(config.recognizer.clone())?,
        ))
    }

    pub fn with_tools(
        downloader: Box<dyn Downloader>,
        transcoder: Box<dyn Transcoder>,
        recognizer: Box<dyn Recognizer>,
    ) -> Self {
        Self {
            downloader,
            transcoder,
            recognizer,
        }
    }

    /// Check the tools a batch run depends on up front. The recognizer is
    /// exempt: the pipeline provisions it on demand.
    pub fn check_availability(&self) -> Result<()> {
        self.downloader.check_availability()?;
        self.transcoder.check_availability()?;
        Ok(())
    }

    /// Ensure the subtitle artifact exists for the task, then apply the
    /// channel's artifact retention policy. Returns the subtitle path.
    pub async fn run(&self, task: &VideoTask<'_>) -> Result<PathBuf> {
        let audio = task.audio_path();
        let waveform = task.waveform_path();
        let subtitle = task.subtitle_path();

        // The subtitle file doubles as the "already done" marker.
        if subtitle.is_file() {
            debug!("Subtitles already exist at {}, skipping", subtitle.display());
            return Ok(subtitle);
        }

        if !audio.is_file() {
            self.downloader
                .fetch_audio(task.video_id, &audio, task.keep_original)
                .await?;
        } else {
            debug!("Audio artifact already exists at {}", audio.display());
        }

        if !waveform.is_file() {
            self.transcoder
                .transcode_to_waveform(&audio, &waveform)
                .await?;
        } else {
            debug!("Waveform artifact already exists at {}", waveform.display());
        }

        let base = task.output_base();
        if let Err(e) = self
            .recognizer
            .generate_subtitles(&waveform, &base, task.language)
            .await
        {
            warn!("Transcription failed ({}), provisioning engine and retrying once", e);
            self.recognizer.provision().await?;
            self.recognizer
                .generate_subtitles(&waveform, &base, task.language)
                .await?;
        }

        if !subtitle.is_file() {
            return Err(TubescribeError::Tool(format!(
                "Recognizer exited successfully but {} was not produced",
                subtitle.display()
            )));
        }

        self.cleanup(task, &audio, &waveform)?;

        Ok(subtitle)
    }

    // Intermediate artifacts go unless the channel keeps them; a failed
    // delete aborts the run like any other filesystem error.
    fn cleanup(&self, task: &VideoTask<'_>, audio: &Path, waveform: &Path) -> Result<()> {
        if !task.keep_mp3 {
            info!("Deleting audio artifact {}", audio.display());
            std::fs::remove_file(audio)?;
        }
        if !task.keep_wav {
            info!("Deleting waveform artifact {}", waveform.display());
            std::fs::remove_file(waveform)?;
        }
        Ok(())
    }
}
