//! Descriptor record types
//!
//! The descriptor is authored once per release as TOML and parsed into these
//! types. After loading nothing mutates it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Entry point group holding installable shell commands
pub const CONSOLE_SCRIPTS: &str = "console_scripts";

/// Top-level descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Descriptor {
    pub package: PackageMetadata,
    #[serde(default)]
    pub layout: PackageLayout,
    #[serde(default)]
    pub dependencies: DependencySpec,
    /// group -> command name -> `module:callable`
    #[serde(default)]
    pub entry_points: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub urls: BTreeMap<String, String>,

    /// Runtime only - directory the descriptor was loaded from
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Package identity and author metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// README path relative to the descriptor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default = "default_readme_content_type")]
    pub readme_content_type: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_email: String,
    /// License trove classifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default)]
    pub classifiers: Vec<String>,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_python: Option<String>,
    #[serde(default)]
    pub include_package_data: bool,

    /// Runtime only - README contents, filled in on load
    #[serde(skip)]
    pub long_description: String,
}

fn default_readme_content_type() -> String {
    "text/markdown".to_string()
}

/// Runtime requirements plus opt-in extras
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DependencySpec {
    #[serde(default)]
    pub runtime: Vec<String>,
    #[serde(default)]
    pub extras: BTreeMap<String, Vec<String>>,
}

/// Where importable code lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PackageLayout {
    #[serde(default = "default_source_root")]
    pub source_root: String,
}

impl Default for PackageLayout {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
        }
    }
}

fn default_source_root() -> String {
    "src".to_string()
}

/// A single entry point: `name = module:callable` inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub group: String,
    pub name: String,
    pub module: String,
    pub callable: String,
}

impl EntryPoint {
    /// `module:callable` reference
    pub fn target(&self) -> String {
        format!("{}:{}", self.module, self.callable)
    }
}
