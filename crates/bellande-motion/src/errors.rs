use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotionError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Process failed (exit {status:?}): {stderr}")]
    ProcessFailed { status: Option<i32>, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
