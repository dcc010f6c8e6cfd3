use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Hosted Bellande Motion Probability endpoint
pub const DEFAULT_API_URL: &str = "https://bellande-robotics-sensors-research-innovation-center.org/api/Bellande_Motion_Probability/bellande_motion_probability";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "BELLANDE_CONFIG";

const CONFIG_FILE_NAME: &str = "bellande.toml";
const POINTER_FILE_NAME: &str = ".bellande_config_path";

pub const SUPPORTED_KEYS: &[&str] = &[
    "api-url",
    "executable-path",
    "timeout-secs",
    "install-prefix",
];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_prefix: Option<String>,
}

impl Config {
    /// Resolve the config file path.
    ///
    /// Order: `BELLANDE_CONFIG`, then a pointer file next to the default
    /// config, then `~/.config/bellande/bellande.toml`.
    pub fn path() -> PathBuf {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let default = Self::default_path();

        if let Some(pointer) = Self::pointer_path() {
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
        }

        default
    }

    fn default_path() -> PathBuf {
        #[cfg(not(target_os = "windows"))]
        let base = dirs::home_dir().map(|h| h.join(".config"));

        #[cfg(target_os = "windows")]
        let base = dirs::config_dir();

        base.unwrap_or_else(|| PathBuf::from("."))
            .join("bellande")
            .join(CONFIG_FILE_NAME)
    }

    /// Location of the pointer file used by `config path <new>`
    pub fn pointer_path() -> Option<PathBuf> {
        Self::default_path()
            .parent()
            .map(|parent| parent.join(POINTER_FILE_NAME))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path())
    }

    /// Load from an explicit path, returning defaults when the file is absent
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::path())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api-url" => self.api_url.clone(),
            "executable-path" => self.executable_path.clone(),
            "timeout-secs" => self.timeout_secs.map(|t| t.to_string()),
            "install-prefix" => self.install_prefix.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "api-url" => self.api_url = Some(value),
            "executable-path" => self.executable_path = Some(value),
            "timeout-secs" => {
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.clone(),
                    })?;
                self.timeout_secs = Some(secs);
            }
            "install-prefix" => self.install_prefix = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.api_url.is_none()
            && self.executable_path.is_none()
            && self.timeout_secs.is_none()
            && self.install_prefix.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        SUPPORTED_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Request timeout; a zero left in a hand-edited file falls back to the default
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Install prefix, defaulting to `<data-local-dir>/bellande`
    pub fn install_prefix(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref prefix) = self.install_prefix {
            return Ok(expand_tilde(prefix));
        }
        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|dir| dir.join("bellande"))
            .ok_or(ConfigError::NoHomeDir)
    }

    pub fn executable_path(&self) -> Option<PathBuf> {
        self.executable_path.as_deref().map(expand_tilde)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if path == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    }
}
