//! Errors surfaced by the command handlers

use bellande_config::ConfigError;
use bellande_descriptor::DescriptorError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Embedded descriptor is invalid: {0}")]
    EmbeddedDescriptor(String),

    #[error("No artifact at {}; run `bellande_dist build` first", .0.display())]
    ArtifactMissing(PathBuf),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Unresolvable commands and entry points use 127 like a shell does.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Descriptor(
                DescriptorError::CommandNotFound(_) | DescriptorError::EntryPointNotFound { .. },
            ) => 127,
            _ => 1,
        }
    }
}
