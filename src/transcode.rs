use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::config::TranscoderConfig;
use crate::error::Result;
use crate::process::ToolCommand;

/// Waveform transcode seam between the pipeline and ffmpeg.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Transcode an audio file into the recognizer's waveform format.
    async fn transcode_to_waveform(&self, audio_path: &Path, waveform_path: &Path) -> Result<()>;

    /// Check the transcoder binary is present and runnable.
    fn check_availability(&self) -> Result<()>;
}

/// ffmpeg based transcoder producing mono 16 kHz signed 16-bit PCM, the
/// input format the recognition engine expects.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    fn waveform_command(&self, audio_path: &Path, waveform_path: &Path) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, "Waveform transcode")
            .arg("-i")
            .path(audio_path)
            .arg("-ar")
            .arg("16000")
            .arg("-ac")
            .arg("1")
            .arg("-c:a")
            .arg("pcm_s16le")
            .args(self.config.extra_options.iter().cloned())
            .arg("-y")
            .path(waveform_path)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode_to_waveform(&self, audio_path: &Path, waveform_path: &Path) -> Result<()> {
        info!(
            "Transcoding {} to waveform {}",
            audio_path.display(),
            waveform_path.display()
        );

        self.waveform_command(audio_path, waveform_path).execute()?;

        info!("Waveform transcode completed");
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        ToolCommand::new(&self.config.binary_path, "Transcoder version check")
            .arg("-version")
            .execute()
    }
}

/// Factory for creating transcoder instances
pub struct TranscoderFactory;

impl TranscoderFactory {
    pub fn create_transcoder(config: TranscoderConfig) -> Box<dyn Transcoder> {
        Box::new(FfmpegTranscoder::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_command_parameters() {
        let transcoder = FfmpegTranscoder::new(TranscoderConfig {
            binary_path: "ffmpeg".to_string(),
            extra_options: Vec::new(),
        });

        let cmd = transcoder.waveform_command(Path::new("a.mp3"), Path::new("a.wav"));
        assert_eq!(
            cmd.args,
            vec!["-i", "a.mp3", "-ar", "16000", "-ac", "1", "-c:a", "pcm_s16le", "-y", "a.wav"]
        );
    }
}
