use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, TubescribeError};

/// Per-channel index file name inside the channel working directory.
pub const INDEX_FILE_NAME: &str = "_all_videos_.txt";

/// One listing record: bare video id plus display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    pub video_id: String,
    pub title: String,
}

/// Read a channel index into a video id -> title mapping.
///
/// A missing or empty file reads as an empty mapping. Later duplicate ids
/// overwrite earlier ones. Iteration order of the result is unspecified.
pub fn read_index<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    let mut videos = HashMap::new();

    if !path.is_file() {
        return Ok(videos);
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(videos);
    }

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (video_id, raw_title) = line.split_once(',').ok_or_else(|| {
            TubescribeError::MalformedRecord(format!(
                "{}:{}: missing delimiter in {:?}",
                path.display(),
                line_no + 1,
                line
            ))
        })?;
        videos.insert(video_id.to_string(), unquote(raw_title).to_string());
    }

    debug!("Read {} index entries from {}", videos.len(), path.display());
    Ok(videos)
}

/// Serialize the full entry list, replacing any previous file contents.
pub fn write_index<P: AsRef<Path>>(path: P, entries: &[VideoEntry]) -> Result<()> {
    let mut content = String::new();
    for entry in entries {
        content.push_str(&format!("{},\"{}\"\n", entry.video_id, entry.title));
    }
    std::fs::write(path.as_ref(), content)?;

    debug!(
        "Wrote {} index entries to {}",
        entries.len(),
        path.as_ref().display()
    );
    Ok(())
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}
