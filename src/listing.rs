use std::path::Path;
use tracing::info;

use crate::config::{ChannelConfig, DownloaderConfig};
use crate::error::{Result, TubescribeError};
use crate::index::{self, VideoEntry};
use crate::process::ToolCommand;

/// Enumerates a channel's or playlist's videos through the external lister
/// and persists the result as the channel index.
pub struct ChannelLister {
    binary_path: String,
}

impl ChannelLister {
    pub fn new(config: &DownloaderConfig) -> Self {
        Self {
            binary_path: config.binary_path.clone(),
        }
    }

    /// Re-list the channel and overwrite its index file with the result.
    pub async fn refresh(&self, channel: &ChannelConfig, index_path: &Path) -> Result<usize> {
        let entries = if let Some(playlist_id) = &channel.playlist_id {
            info!("Listing playlist {} for channel '{}'", playlist_id, channel.channel_name);
            self.list_playlist(playlist_id).await?
        } else if let Some(channel_id) = &channel.channel_id {
            info!("Listing channel {} for channel '{}'", channel_id, channel.channel_name);
            self.list_channel(channel_id).await?
        } else {
            return Err(TubescribeError::Config(format!(
                "Channel '{}' has no listing source",
                channel.channel_name
            )));
        };

        index::write_index(index_path, &entries)?;
        info!(
            "Indexed {} videos for channel '{}'",
            entries.len(),
            channel.channel_name
        );
        Ok(entries.len())
    }

    pub async fn list_channel(&self, channel_id: &str) -> Result<Vec<VideoEntry>> {
        self.list_url(&format!("https://www.youtube.com/channel/{}/videos", channel_id))
            .await
    }

    pub async fn list_playlist(&self, playlist_id: &str) -> Result<Vec<VideoEntry>> {
        self.list_url(&format!("https://www.youtube.com/playlist?list={}", playlist_id))
            .await
    }

    async fn list_url(&self, url: &str) -> Result<Vec<VideoEntry>> {
        let stdout = ToolCommand::new(&self.binary_path, "Channel listing")
            .arg("--flat-playlist")
            .arg("--dump-json")
            .arg("--no-warnings")
            .arg(url)
            .execute_capture()?;

        parse_listing(&stdout)
    }
}

/// Parse flat-playlist output: one JSON object per line, each carrying at
/// least a video id and a display title. An entry missing either field fails
/// the whole listing.
pub fn parse_listing(stdout: &str) -> Result<Vec<VideoEntry>> {
    let mut entries = Vec::new();

    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let record: serde_json::Value = serde_json::from_str(line)?;

        let video_id = record["id"].as_str().ok_or_else(|| {
            TubescribeError::MalformedRecord(format!("Listing entry has no video id: {}", line))
        })?;
        let title = record["title"].as_str().ok_or_else(|| {
            TubescribeError::MalformedRecord(format!(
                "Listing entry {} has no title",
                video_id
            ))
        })?;

        entries.push(VideoEntry {
            video_id: video_id.to_string(),
            title: title.to_string(),
        });
    }

    Ok(entries)
}
