use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// The start command did not yield a usable task id: either no command
    /// bridge is attached or the backend refused the request. This is the only
    /// failure surfaced synchronously to the initiating action.
    #[error("Download backend unavailable")]
    DownloadUnavailable,
}

pub type Result<T> = std::result::Result<T, LauncherError>;
