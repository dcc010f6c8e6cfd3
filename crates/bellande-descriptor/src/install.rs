//! Installing artifacts into a prefix, listing, running and removing them

use crate::artifact::BuiltArtifact;
use crate::entry_points::parser::entry_points_in_group;
use crate::entry_points::EntryPointRegistry;
use crate::errors::DescriptorError;
use crate::metadata_writer::{ENTRY_POINTS_FILE, INSTALLER_FILE};
use crate::package_discovery::{find_module_file, find_packages};
use crate::requirement::normalize_name;
use crate::types::{DependencySpec, CONSOLE_SCRIPTS};
use bellande_config::PrefixLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const INSTALLER_NAME: &str = "bellande_dist";

/// One installed distribution as recorded in `installed.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledDistribution {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub extras: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub top_level: Vec<String>,
    #[serde(default)]
    pub console_scripts: Vec<String>,
    pub dist_info: String,
    /// Runtime only - packages found in site-packages when listed
    #[serde(skip)]
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    #[serde(default)]
    pub distributions: Vec<InstalledDistribution>,
}

impl InstallRecord {
    pub fn load(layout: &PrefixLayout) -> Result<Self, DescriptorError> {
        let path = layout.record_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, layout: &PrefixLayout) -> Result<(), DescriptorError> {
        let path = layout.record_path();
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(self)?)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&InstalledDistribution> {
        let wanted = normalize_name(name);
        self.distributions
            .iter()
            .find(|d| normalize_name(&d.name) == wanted)
    }

    fn remove(&mut self, name: &str) -> Option<InstalledDistribution> {
        let wanted = normalize_name(name);
        let idx = self
            .distributions
            .iter()
            .position(|d| normalize_name(&d.name) == wanted)?;
        Some(self.distributions.remove(idx))
    }

    fn upsert(&mut self, dist: InstalledDistribution) {
        self.remove(&dist.name);
        self.distributions.push(dist);
        self.distributions.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub extras: Vec<String>,
    /// Program the console launchers exec into
    pub launcher_program: String,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            extras: Vec::new(),
            launcher_program: INSTALLER_NAME.to_string(),
        }
    }
}

/// Install a built artifact into a prefix.
///
/// Dependencies are resolved for the requested extras before anything is
/// copied; an existing install of the same distribution is replaced.
pub fn install(
    artifact_path: &Path,
    layout: &PrefixLayout,
    options: &InstallOptions,
) -> Result<InstalledDistribution, DescriptorError> {
    let artifact = BuiltArtifact::open(artifact_path)?;
    let metadata = &artifact.metadata;

    let spec = DependencySpec::from_requires_dist(&metadata.requires_dist, &metadata.provides_extra);
    let resolution = spec.resolve(&options.extras)?;

    layout.ensure()?;
    let mut record = InstallRecord::load(layout)?;
    if record.get(&metadata.name).is_some() {
        debug!("Replacing existing install of {}", metadata.name);
        remove_files(layout, &mut record, &metadata.name)?;
        record.save(layout)?;
    }

    let site_packages = layout.site_packages();
    copy_tree(&artifact.path, &site_packages)?;

    let dist_info_name = artifact
        .dist_info
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| DescriptorError::InvalidArtifact(artifact.path.clone()))?;
    fs::write(
        site_packages.join(&dist_info_name).join(INSTALLER_FILE),
        format!("{}\n", INSTALLER_NAME),
    )?;

    let mut console_scripts = Vec::new();
    for entry in artifact.console_scripts() {
        write_launcher(layout, &entry.name, &options.launcher_program)?;
        console_scripts.push(entry.name.clone());
    }

    let dist = InstalledDistribution {
        name: metadata.name.clone(),
        version: metadata.version.clone(),
        extras: options.extras.clone(),
        requirements: resolution
            .requirements
            .iter()
            .map(|r| r.requirement.to_string())
            .collect(),
        top_level: artifact.top_level.clone(),
        console_scripts,
        dist_info: dist_info_name,
        packages: Vec::new(),
    };
    record.upsert(dist.clone());
    record.save(layout)?;

    info!(
        "Installed {} {} into {}",
        dist.name,
        dist.version,
        layout.root().display()
    );
    Ok(dist)
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), DescriptorError> {
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| DescriptorError::InvalidArtifact(from.to_path_buf()))?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn write_launcher(
    layout: &PrefixLayout,
    command: &str,
    program: &str,
) -> Result<PathBuf, DescriptorError> {
    let path = layout.launcher_path(command);
    let root = layout.root().display();

    #[cfg(not(windows))]
    let script = format!(
        "#!/bin/sh\nexec \"{}\" run --prefix \"{}\" {} -- \"$@\"\n",
        program, root, command
    );
    #[cfg(windows)]
    let script = format!(
        "@echo off\r\n\"{}\" run --prefix \"{}\" {} -- %*\r\n",
        program, root, command
    );

    fs::write(&path, script)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    debug!("Wrote launcher: {:?}", path);
    Ok(path)
}

/// Installed distributions with their packages re-discovered from site-packages
pub fn list_installed(layout: &PrefixLayout) -> Result<Vec<InstalledDistribution>, DescriptorError> {
    let record = InstallRecord::load(layout)?;
    let site_packages = layout.site_packages();
    let found = if site_packages.is_dir() {
        find_packages(&site_packages)?
    } else {
        Vec::new()
    };

    Ok(record
        .distributions
        .into_iter()
        .map(|mut dist| {
            dist.packages = found
                .iter()
                .filter(|pkg| {
                    let head = pkg.split('.').next().unwrap_or(pkg.as_str());
                    dist.top_level.iter().any(|top| top == head)
                })
                .cloned()
                .collect();
            dist
        })
        .collect())
}

/// Remove an installed distribution
pub fn uninstall(layout: &PrefixLayout, name: &str) -> Result<InstalledDistribution, DescriptorError> {
    let mut record = InstallRecord::load(layout)?;
    let removed = remove_files(layout, &mut record, name)?;
    record.save(layout)?;
    info!("Uninstalled {} {}", removed.name, removed.version);
    Ok(removed)
}

fn remove_files(
    layout: &PrefixLayout,
    record: &mut InstallRecord,
    name: &str,
) -> Result<InstalledDistribution, DescriptorError> {
    let dist = record
        .remove(name)
        .ok_or_else(|| DescriptorError::NotInstalled(name.to_string()))?;
    let site_packages = layout.site_packages();

    for top in &dist.top_level {
        let dir = site_packages.join(top);
        if dir.is_dir() {
            fs::remove_dir_all(&dir)?;
        }
    }
    let dist_info = site_packages.join(&dist.dist_info);
    if dist_info.is_dir() {
        fs::remove_dir_all(&dist_info)?;
    }
    for command in &dist.console_scripts {
        let launcher = layout.launcher_path(command);
        if launcher.is_file() {
            fs::remove_file(&launcher)?;
        }
    }
    Ok(dist)
}

/// Dispatch an installed console command.
///
/// The command must be declared by an installed distribution, its target
/// module must be present in site-packages, and its callable must be bound in
/// `registry`. `args` excludes the command name.
pub fn run_console_script(
    layout: &PrefixLayout,
    command: &str,
    args: &[String],
    registry: &EntryPointRegistry,
) -> Result<i32, DescriptorError> {
    let record = InstallRecord::load(layout)?;
    let site_packages = layout.site_packages();

    let entry = record
        .distributions
        .iter()
        .filter_map(|dist| {
            let content =
                fs::read_to_string(site_packages.join(&dist.dist_info).join(ENTRY_POINTS_FILE)).ok()?;
            entry_points_in_group(&content, CONSOLE_SCRIPTS)
                .into_iter()
                .find(|ep| ep.name == command)
        })
        .next()
        .ok_or_else(|| DescriptorError::CommandNotFound(command.to_string()))?;

    if find_module_file(&site_packages, &entry.module).is_none() {
        return Err(DescriptorError::EntryPointNotFound {
            target: entry.target(),
            reason: format!("module '{}' is not installed", entry.module),
        });
    }

    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(command.to_string());
    argv.extend(args.iter().cloned());

    debug!("Dispatching {} -> {}", command, entry.target());
    registry.invoke(&entry.target(), &argv)
}
