//! Tubescribe - Batch Subtitle Generation for YouTube Channels
//!
//! This is the main entry point for the Tubescribe application, which
//! downloads audio for configured channels, transcodes it to a normalized
//! waveform, and generates subtitle files using whisper-cpp.

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use tubescribe::cli::{Args, Commands};
use tubescribe::config::Config;
use tubescribe::index::{self, INDEX_FILE_NAME};
use tubescribe::setup::SetupManager;
use tubescribe::slug::normalize_title;
use tubescribe::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("tubescribe.toml").exists() {
                info!("Found tubescribe.toml in current directory, loading...");
                Config::from_file("tubescribe.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Execute command
    match args.command {
        Commands::Run => {
            info!("Starting batch run over {} channels", config.channels.len());
            let workflow = Workflow::new(config)?;
            workflow.run_all().await?;
        }
        Commands::Channel { name } => {
            info!("Processing single channel '{}'", name);
            let workflow = Workflow::new(config)?;
            workflow.run_channel_by_name(&name).await?;
        }
        Commands::Refresh { name } => {
            info!("Refreshing index for channel '{}'", name);
            let workflow = Workflow::new(config)?;
            let count = workflow.refresh_channel(&name).await?;
            println!("Indexed {} videos for channel '{}'", count, name);
        }
        Commands::Video { url, language, title, output_dir, keep_original } => {
            info!("Processing single video: {}", url);
            let workflow = Workflow::new(config)?;
            let subtitle = workflow
                .run_single_video(&url, &language, title.as_deref(), &output_dir, keep_original)
                .await?;
            println!("Subtitles written to {}", subtitle.display());
        }
        Commands::Models { download } => {
            info!("Listing available whisper models...");
            models_command(&config, download).await?;
        }
        Commands::Setup => {
            info!("Provisioning recognition engine...");
            let setup = SetupManager::new(config.recognizer.clone())?;
            setup.provision().await?;
            println!("Recognition engine ready at {}", config.recognizer.engine_dir.display());
        }
        Commands::Status => {
            status_command(&config)?;
        }
        Commands::Init { path } => {
            Config::default().save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    info!("Tubescribe completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let app_dir = std::env::current_dir()?.join(".tubescribe");
    let log_dir = app_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "tubescribe.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber.try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Print the model table with download status, optionally fetching what is
/// missing.
async fn models_command(config: &Config, download: bool) -> Result<()> {
    let setup = SetupManager::new(config.recognizer.clone())?;
    let models = SetupManager::available_models();
    let models_dir = config.recognizer.engine_dir.join("models");

    println!("\nAvailable Whisper Models:");
    println!("{:<16} {:<24} {:<10} {:<10}", "Name", "Filename", "Size (MB)", "Status");
    println!("{}", "-".repeat(64));

    for model in &models {
        let local_path = models_dir.join(&model.filename);
        let status = if local_path.exists() { "Downloaded" } else { "Missing" };

        println!(
            "{:<16} {:<24} {:<10.1} {:<10}",
            model.name, model.filename, model.size_mb, status
        );
    }

    if download {
        info!("Downloading all missing models...");
        for model in &models {
            let local_path = models_dir.join(&model.filename);
            if !local_path.exists() {
                setup.download_model(model).await?;
            }
        }
        info!("All models downloaded successfully");
    }

    Ok(())
}

/// Print per-channel index freshness and subtitle progress.
fn status_command(config: &Config) -> Result<()> {
    if config.channels.is_empty() {
        println!("No channels configured.");
        return Ok(());
    }

    println!("\nChannel Status:");
    println!("{:<20} {:<8} {:<10} {:<20}", "Channel", "Videos", "Subtitled", "Index refreshed");
    println!("{}", "-".repeat(60));

    for channel in &config.channels {
        let workdir = config.output_dir.join(&channel.channel_name);
        let index_path = workdir.join(INDEX_FILE_NAME);
        let videos = index::read_index(&index_path)?;

        let subtitled = videos
            .values()
            .filter(|title| workdir.join(format!("{}.srt", normalize_title(title))).is_file())
            .count();

        let refreshed = match std::fs::metadata(&index_path).and_then(|m| m.modified()) {
            Ok(modified) => {
                let local: DateTime<Local> = modified.into();
                local.format("%Y-%m-%d %H:%M").to_string()
            }
            Err(_) => "never".to_string(),
        };

        println!(
            "{:<20} {:<8} {:<10} {:<20}",
            channel.channel_name,
            videos.len(),
            subtitled,
            refreshed
        );
    }

    Ok(())
}
