use std::path::PathBuf;
use reqwest::Client;
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::RecognizerConfig;
use crate::error::{Result, TubescribeError};
use crate::process::ToolCommand;

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Owns the recognition engine checkout and its model inventory.
///
/// Provisioning is idempotent: the checkout is cloned only when missing, the
/// build runs unconditionally (a broken binary is the usual reason we are
/// here), and the model is downloaded only when absent.
pub struct SetupManager {
    client: Client,
    config: RecognizerConfig,
}

#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub filename: String,
    pub url: String,
    pub size_mb: f64,
}

impl ModelInfo {
    fn for_model(name: &str, size_mb: f64) -> Self {
        let filename = format!("ggml-{}.bin", name);
        Self {
            name: name.to_string(),
            url: format!("{}/{}", MODEL_BASE_URL, filename),
            filename,
            size_mb,
        }
    }
}

impl SetupManager {
    pub fn new(config: RecognizerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("tubescribe/0.1.0")
            .build()
            .map_err(TubescribeError::Http)?;

        Ok(Self { client, config })
    }

    /// Provision the engine and the configured model from scratch if needed.
    pub async fn provision(&self) -> Result<()> {
        info!("Provisioning recognition engine in {}", self.config.engine_dir.display());
        self.ensure_checkout()?;
        self.build_engine()?;
        self.ensure_model().await?;
        info!("Recognition engine provisioned");
        Ok(())
    }

    fn ensure_checkout(&self) -> Result<()> {
        if self.config.engine_dir.is_dir() {
            info!("Engine checkout already present");
            return Ok(());
        }

        info!("Cloning {} into {}", self.config.repo_url, self.config.engine_dir.display());
        ToolCommand::new("git", "Engine checkout")
            .arg("clone")
            .arg(&self.config.repo_url)
            .path(&self.config.engine_dir)
            .execute()
    }

    fn build_engine(&self) -> Result<()> {
        info!("Building recognition engine");
        ToolCommand::new("make", "Engine build")
            .arg("-C")
            .path(&self.config.engine_dir)
            .execute()
    }

    /// Download the configured model when it is not already on disk.
    pub async fn ensure_model(&self) -> Result<PathBuf> {
        let model_path = self.model_path();
        if model_path.is_file() {
            info!("Model {} already present", self.config.model);
            return Ok(model_path);
        }

        let info = Self::available_models()
            .into_iter()
            .find(|m| m.name == self.config.model)
            .unwrap_or_else(|| ModelInfo::for_model(&self.config.model, 0.0));

        self.download_model(&info).await
    }

    /// Path of the configured ggml model inside the engine checkout.
    pub fn model_path(&self) -> PathBuf {
        self.config
            .engine_dir
            .join("models")
            .join(format!("ggml-{}.bin", self.config.model))
    }

    /// Path of the recognition binary inside the engine checkout.
    pub fn engine_binary(&self) -> PathBuf {
        self.config.engine_dir.join(&self.config.binary_name)
    }

    pub fn available_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo::for_model("tiny", 39.0),
            ModelInfo::for_model("base", 142.0),
            ModelInfo::for_model("small", 244.0),
            ModelInfo::for_model("medium", 769.0),
            ModelInfo::for_model("large-v2", 1550.0),
            ModelInfo::for_model("large-v3", 1550.0),
            ModelInfo::for_model("large-v3-q5_0", 1080.0),
        ]
    }

    pub async fn download_model(&self, model: &ModelInfo) -> Result<PathBuf> {
        let models_dir = self.config.engine_dir.join("models");
        async_fs::create_dir_all(&models_dir).await?;
        let local_path = models_dir.join(&model.filename);

        if local_path.is_file() {
            info!("Model {} already exists at {}", model.name, local_path.display());
            return Ok(local_path);
        }

        info!("Downloading {} model ({:.1} MB)...", model.name, model.size_mb);

        let response = self.client.get(&model.url).send().await.map_err(TubescribeError::Http)?;

        if !response.status().is_success() {
            return Err(TubescribeError::Setup(format!(
                "Failed to download model {}: HTTP {}",
                model.name,
                response.status()
            )));
        }

        let pb = match response.content_length() {
            Some(len) => {
                let pb = ProgressBar::new(len);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                        .unwrap()
                        .progress_chars("#>-"),
                );
                pb
            }
            None => ProgressBar::new_spinner(),
        };

        // Download into a temp file, then move into place
        let temp_path = local_path.with_extension("tmp");
        let mut file = async_fs::File::create(&temp_path).await?;

        let bytes = response.bytes().await.map_err(TubescribeError::Http)?;
        file.write_all(&bytes).await?;
        pb.set_position(bytes.len() as u64);

        file.flush().await?;
        drop(file);

        async_fs::rename(&temp_path, &local_path).await?;

        pb.finish_with_message(format!("Downloaded {}", model.name));
        info!("Successfully downloaded {} to {}", model.name, local_path.display());

        Ok(local_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config(engine_dir: PathBuf) -> RecognizerConfig {
        RecognizerConfig {
            engine_dir,
            binary_name: "main".to_string(),
            model: "base".to_string(),
            repo_url: "https://github.com/ggerganov/whisper.cpp.git".to_string(),
        }
    }

    #[test]
    fn test_model_and_binary_paths() {
        let manager = SetupManager::new(sample_config(PathBuf::from("whisper.cpp"))).unwrap();
        assert_eq!(
            manager.model_path(),
            PathBuf::from("whisper.cpp/models/ggml-base.bin")
        );
        assert_eq!(manager.engine_binary(), PathBuf::from("whisper.cpp/main"));
    }

    #[test]
    fn test_model_table_urls() {
        for model in SetupManager::available_models() {
            assert!(model.url.ends_with(&model.filename));
            assert!(model.filename.starts_with("ggml-"));
        }
    }

    #[tokio::test]
    async fn test_ensure_model_short_circuits_on_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = sample_config(dir.path().to_path_buf());
        let manager = SetupManager::new(config).unwrap();

        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        std::fs::write(manager.model_path(), b"stub").unwrap();

        // No network involved when the model file already exists
        let path = manager.ensure_model().await.unwrap();
        assert_eq!(path, manager.model_path());
    }
}
