use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::config::RecognizerConfig;
use crate::error::Result;
use crate::process::ToolCommand;
use crate::setup::SetupManager;

/// Speech-recognition seam. `generate_subtitles` must leave an `.srt` file
/// at `<output_base>.srt` on success; `provision` is the one-shot repair the
/// pipeline runs before its single retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn generate_subtitles(
        &self,
        waveform_path: &Path,
        output_base: &Path,
        language: &str,
    ) -> Result<()>;

    /// Re-provision the recognition engine and model.
    async fn provision(&self) -> Result<()>;
}

/// whisper.cpp based recognizer driving the engine binary as a subprocess.
pub struct WhisperCppRecognizer {
    setup: SetupManager,
}

impl WhisperCppRecognizer {
    pub fn new(config: RecognizerConfig) -> Result<Self> {
        Ok(Self {
            setup: SetupManager::new(config)?,
        })
    }
}

#[async_trait]
impl Recognizer for WhisperCppRecognizer {
    async fn generate_subtitles(
        &self,
        waveform_path: &Path,
        output_base: &Path,
        language: &str,
    ) -> Result<()> {
        info!(
            "Transcribing {} (language {})",
            waveform_path.display(),
            language
        );

        ToolCommand::new(
            self.setup.engine_binary().to_string_lossy().to_string(),
            "Subtitle recognition",
        )
        .arg("-m")
        .path(self.setup.model_path())
        .arg("--output-srt")
        .arg("-of")
        .path(output_base)
        .arg("-f")
        .path(waveform_path)
        .arg("--language")
        .arg(language)
        .execute()?;

        info!("Transcription completed for {}", waveform_path.display());
        Ok(())
    }

    async fn provision(&self) -> Result<()> {
        self.setup.provision().await
    }
}

/// Factory for creating recognizer instances
pub struct RecognizerFactory;

impl RecognizerFactory {
    pub fn create_recognizer(config: RecognizerConfig) -> Result<Box<dyn Recognizer>> {
        Ok(Box::new(WhisperCppRecognizer::new(config)?))
    }
}
