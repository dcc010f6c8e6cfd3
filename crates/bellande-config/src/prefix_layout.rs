//! Directory layout of an install prefix
//!
//! An install prefix mirrors a Python environment:
//! - **Unix/macOS**: `<prefix>/lib/site-packages`, `<prefix>/bin`
//! - **Windows**: `<prefix>/Lib/site-packages`, `<prefix>/Scripts`
//!
//! plus an `installed.json` record of the distributions installed into it.

use crate::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// "Lib" on Windows, "lib" on Unix
#[cfg(windows)]
pub const LIB_DIR: &str = "Lib";
#[cfg(not(windows))]
pub const LIB_DIR: &str = "lib";

/// "Scripts" on Windows, "bin" on Unix
#[cfg(windows)]
pub const BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const BIN_DIR: &str = "bin";

pub const SITE_PACKAGES_DIR: &str = "site-packages";
pub const INSTALL_RECORD_FILE: &str = "installed.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixLayout {
    root: PathBuf,
}

impl PrefixLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open an existing prefix, failing if the root directory is missing
    pub fn open(root: &Path) -> Result<Self, ConfigError> {
        if !root.is_dir() {
            return Err(ConfigError::PrefixNotFound(root.to_path_buf()));
        }
        Ok(Self::new(root))
    }

    /// Create the prefix directories if needed
    pub fn ensure(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(self.site_packages())?;
        fs::create_dir_all(self.bin_dir())?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn site_packages(&self) -> PathBuf {
        self.root.join(LIB_DIR).join(SITE_PACKAGES_DIR)
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    pub fn record_path(&self) -> PathBuf {
        self.root.join(INSTALL_RECORD_FILE)
    }

    /// Path of the launcher written for a console command
    pub fn launcher_path(&self, command: &str) -> PathBuf {
        #[cfg(windows)]
        {
            self.bin_dir().join(format!("{}.cmd", command))
        }
        #[cfg(not(windows))]
        {
            self.bin_dir().join(command)
        }
    }
}
