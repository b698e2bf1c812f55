use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Browser launch failed: {0}")]
    LaunchError(String),

    #[error("Browser protocol error: {0}")]
    CdpError(#[from] chromiumoxide::error::CdpError),

    #[error("Navigation to {url} timed out after {secs}s")]
    NavigationTimeout { url: String, secs: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
