use thiserror::Error;

#[derive(Error, Debug)]
pub enum TubescribeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External tool failure: {0}")]
    Tool(String),

    #[error("External tool not found: {0}. Install it and make sure it is on PATH")]
    ToolNotFound(String),

    #[error("Malformed index record: {0}")]
    MalformedRecord(String),

    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TubescribeError>;
