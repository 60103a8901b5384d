use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the batch over all configured channels
    Run,

    /// Process a single configured channel
    Channel {
        /// Channel name as configured
        name: String,
    },

    /// Refresh the cached video index for a configured channel
    Refresh {
        /// Channel name as configured
        name: String,
    },

    /// Generate subtitles for a single video given its URL
    Video {
        /// Video URL (watch, short-link, or path form)
        #[arg(short, long)]
        url: String,

        /// Source language for transcription
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Title used for artifact naming; defaults to the video id
        #[arg(short, long)]
        title: Option<String>,

        /// Working directory for artifacts
        #[arg(short, long, default_value = "output/_single_")]
        output_dir: PathBuf,

        /// Keep the original container next to the audio
        #[arg(long)]
        keep_original: bool,
    },

    /// List available whisper models and their status
    Models {
        /// Download all missing models
        #[arg(long)]
        download: bool,
    },

    /// Provision the recognition engine and configured model
    Setup,

    /// Show per-channel index and subtitle progress
    Status,

    /// Write a default configuration file
    Init {
        /// Destination path
        #[arg(short, long, default_value = "tubescribe.toml")]
        path: PathBuf,
    },
}
