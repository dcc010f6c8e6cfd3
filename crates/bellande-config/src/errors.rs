use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or editing the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0}. Supported keys: api-url, executable-path, timeout-secs, install-prefix")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Install prefix not found: {}", .0.display())]
    PrefixNotFound(PathBuf),

    #[error("Could not determine home directory")]
    NoHomeDir,
}
