use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, TubescribeError};

// Default values for optional configuration fields
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for per-channel working directories
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    pub downloader: DownloaderConfig,
    pub transcoder: TranscoderConfig,
    pub recognizer: RecognizerConfig,
    /// Channels processed in order by the batch driver
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Path to downloader binary (e.g., yt-dlp)
    pub binary_path: String,
    /// Explicit ffmpeg location passed through to the downloader
    pub ffmpeg_location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Additional transcode options appended before the output path
    #[serde(default)]
    pub extra_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Directory holding the whisper.cpp checkout
    pub engine_dir: PathBuf,
    /// Name of the recognition binary inside the engine directory
    pub binary_name: String,
    /// Model identifier (e.g., base, medium, large-v3-q5_0)
    pub model: String,
    /// Git repository cloned when the engine checkout is missing
    pub repo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel name, used as the working directory name under output_dir
    pub channel_name: String,
    /// Channel identifier for listing (ignored when playlist_id is set)
    pub channel_id: Option<String>,
    /// Playlist identifier; takes precedence over channel_id
    pub playlist_id: Option<String>,
    /// Source language passed to the recognizer
    pub language: String,
    /// Force a listing refresh even when an index file exists
    #[serde(default)]
    pub refresh_channel_videos: bool,
    /// Keep the original container downloaded alongside the audio
    #[serde(default)]
    pub keep_original: bool,
    /// Keep the audio artifact after subtitle generation
    #[serde(default)]
    pub keep_mp3: bool,
    /// Keep the waveform artifact after subtitle generation
    #[serde(default)]
    pub keep_wav: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            downloader: DownloaderConfig {
                binary_path: "yt-dlp".to_string(),
                ffmpeg_location: None,
            },
            transcoder: TranscoderConfig {
                binary_path: "ffmpeg".to_string(),
                extra_options: Vec::new(),
            },
            recognizer: RecognizerConfig {
                engine_dir: PathBuf::from("whisper.cpp"),
                binary_name: "main".to_string(),
                model: "large-v3-q5_0".to_string(),
                repo_url: "https://github.com/ggerganov/whisper.cpp.git".to_string(),
            },
            channels: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TubescribeError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| TubescribeError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TubescribeError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TubescribeError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Every channel needs a listing source and a language.
    pub fn validate(&self) -> Result<()> {
        for channel in &self.channels {
            if channel.channel_id.is_none() && channel.playlist_id.is_none() {
                return Err(TubescribeError::Config(format!(
                    "Channel '{}' has neither channel_id nor playlist_id",
                    channel.channel_name
                )));
            }
            if channel.language.is_empty() {
                return Err(TubescribeError::Config(format!(
                    "Channel '{}' has an empty language",
                    channel.channel_name
                )));
            }
        }
        Ok(())
    }

    /// Look up a configured channel by name.
    pub fn channel_by_name(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.channel_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_channel() -> ChannelConfig {
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

    #[test]
    fn test_validate_requires_listing_source() {
        let mut config = Config::default();
        let mut channel = sample_channel();
        channel.channel_id = None;
        config.channels.push(channel);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.channels.push(sample_channel());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tubescribe.toml");
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.channels.len(), 1);
        assert_eq!(loaded.channels[0].channel_name, "ren");
        assert_eq!(loaded.recognizer.model, config.recognizer.model);
    }

    #[test]
    fn test_channel_defaults_from_toml() {
        let toml = r#"
            [downloader]
            binary_path = "yt-dlp"

            [transcoder]
            binary_path = "ffmpeg"

            [recognizer]
            engine_dir = "whisper.cpp"
            binary_name = "main"
            model = "base"
            repo_url = "https://github.com/ggerganov/whisper.cpp.git"

            [[channels]]
            channel_name = "osaznato"
            channel_id = "UCabc"
            language = "bg"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        let channel = &config.channels[0];
        assert!(!channel.refresh_channel_videos);
        assert!(!channel.keep_original);
        assert!(!channel.keep_mp3);
        assert!(!channel.keep_wav);
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }
}
