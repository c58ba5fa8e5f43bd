use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContribError>;

#[derive(Error, Debug)]
pub enum ContribError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to run {program}: {source}")]
    GitSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git {args} exited with {status}: {stderr}")]
    GitFailed {
        args: String,
        status: String,
        stderr: String,
    },
    #[error("git {args} timed out after {timeout:?}")]
    GitTimeout { args: String, timeout: Duration },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("No data found in any repository")]
    NoData,
}

impl ContribError {
    /// True for failures of a single external tool invocation, which callers absorb locally.
    pub fn is_git_failure(&self) -> bool {
        matches!(
            self,
            ContribError::GitSpawn { .. } | ContribError::GitFailed { .. } | ContribError::GitTimeout { .. }
        )
    }
}
