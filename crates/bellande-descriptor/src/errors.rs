use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, building, installing or invoking a distribution
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse descriptor: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read install record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Prefix error: {0}")]
    Prefix(#[from] bellande_config::ConfigError),

    #[error("Descriptor file not found: {}", .0.display())]
    DescriptorNotFound(PathBuf),

    #[error("README file not found: {}", .0.display())]
    ReadmeNotFound(PathBuf),

    #[error("Invalid package name: '{0}'")]
    InvalidName(String),

    #[error("Invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Invalid requirement: '{0}'")]
    InvalidRequirement(String),

    #[error("Invalid Python requirement: '{0}'")]
    InvalidPythonRequirement(String),

    #[error("Invalid entry point: {0}")]
    InvalidEntryPoint(String),

    #[error("Unknown extra '{extra}' (available: {available})")]
    UnknownExtra { extra: String, available: String },

    #[error("Source root not found: {}", .0.display())]
    SourceRootMissing(PathBuf),

    #[error("No packages found under source root: {}", .0.display())]
    NoPackagesFound(PathBuf),

    #[error("Entry point target not found: {target} ({reason})")]
    EntryPointNotFound { target: String, reason: String },

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Distribution not installed: {0}")]
    NotInstalled(String),

    #[error("Invalid artifact: {}", .0.display())]
    InvalidArtifact(PathBuf),
}
