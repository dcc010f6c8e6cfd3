//! Building the installable artifact
//!
//! The artifact is an unpacked-wheel directory:
//!
//! ```text
//! <out>/<name>-<version>/
//!     <package>/...                      copied from the source root
//!     <name>-<version>.dist-info/
//!         METADATA
//!         entry_points.txt
//!         top_level.txt
//! ```

use crate::entry_points::parser::{parse_entry_points_txt, render_entry_points_txt};
use crate::errors::DescriptorError;
use crate::metadata_writer::{
    self, parse_metadata, parse_top_level, render_metadata, render_top_level, CoreMetadata,
    ENTRY_POINTS_FILE, METADATA_FILE, TOP_LEVEL_FILE,
};
use crate::package_discovery::{discover_packages, top_level_packages, verify_entry_point};
use crate::types::{Descriptor, EntryPoint, CONSOLE_SCRIPTS};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Fail the build when an entry point target is missing instead of warning
    pub strict: bool,
}

/// A built (or opened) artifact directory
#[derive(Debug, Clone)]
pub struct BuiltArtifact {
    pub path: PathBuf,
    pub dist_info: PathBuf,
    pub metadata: CoreMetadata,
    pub entry_points: Vec<EntryPoint>,
    pub top_level: Vec<String>,
}

impl BuiltArtifact {
    /// Open an artifact directory; it must contain exactly one `.dist-info`
    pub fn open(path: &Path) -> Result<Self, DescriptorError> {
        if !path.is_dir() {
            return Err(DescriptorError::InvalidArtifact(path.to_path_buf()));
        }

        let mut dist_infos = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let is_dist_info = entry.file_name().to_string_lossy().ends_with(".dist-info");
            if is_dist_info && entry.file_type()?.is_dir() {
                dist_infos.push(entry.path());
            }
        }
        let [dist_info] = dist_infos.as_slice() else {
            return Err(DescriptorError::InvalidArtifact(path.to_path_buf()));
        };

        let metadata_path = dist_info.join(METADATA_FILE);
        if !metadata_path.is_file() {
            return Err(DescriptorError::InvalidArtifact(path.to_path_buf()));
        }
        let metadata = parse_metadata(&fs::read_to_string(&metadata_path)?);
        let entry_points = read_optional(&dist_info.join(ENTRY_POINTS_FILE))?
            .map(|content| parse_entry_points_txt(&content))
            .unwrap_or_default();
        let top_level = read_optional(&dist_info.join(TOP_LEVEL_FILE))?
            .map(|content| parse_top_level(&content))
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            dist_info: dist_info.clone(),
            metadata,
            entry_points,
            top_level,
        })
    }

    pub fn console_scripts(&self) -> Vec<&EntryPoint> {
        self.entry_points
            .iter()
            .filter(|ep| ep.group == CONSOLE_SCRIPTS)
            .collect()
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, DescriptorError> {
    if path.is_file() {
        Ok(Some(fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Build the artifact for `descriptor` into `out_dir`.
///
/// The README is re-read here so a README removed after loading still aborts
/// the build before anything is written.
pub fn build(
    descriptor: &Descriptor,
    out_dir: &Path,
    options: BuildOptions,
) -> Result<BuiltArtifact, DescriptorError> {
    let mut descriptor = descriptor.clone();
    descriptor.package.long_description = descriptor.read_readme()?;

    let source_root = descriptor.source_root();
    let packages = discover_packages(&source_root)?;

    for entry in descriptor.entry_points()? {
        if entry.group != CONSOLE_SCRIPTS {
            continue;
        }
        if let Err(e) = verify_entry_point(&source_root, &entry) {
            if options.strict {
                return Err(e);
            }
            warn!("{}; invocation will fail until it is provided", e);
        }
    }

    let artifact_dir = out_dir.join(descriptor.artifact_name());
    if artifact_dir.exists() {
        debug!("Replacing stale artifact: {:?}", artifact_dir);
        fs::remove_dir_all(&artifact_dir)?;
    }
    fs::create_dir_all(&artifact_dir)?;

    for package in &packages {
        copy_package_files(
            &source_root,
            &artifact_dir,
            package,
            descriptor.package.include_package_data,
        )?;
    }

    let dist_info = artifact_dir.join(metadata_writer::dist_info_name(
        &descriptor.package.name,
        &descriptor.package.version,
    ));
    fs::create_dir_all(&dist_info)?;
    fs::write(dist_info.join(METADATA_FILE), render_metadata(&descriptor))?;
    fs::write(
        dist_info.join(ENTRY_POINTS_FILE),
        render_entry_points_txt(&descriptor.entry_points()?),
    )?;
    fs::write(
        dist_info.join(TOP_LEVEL_FILE),
        render_top_level(&top_level_packages(&packages)),
    )?;

    info!("Built artifact: {}", artifact_dir.display());
    BuiltArtifact::open(&artifact_dir)
}

/// Copy the files directly inside one package directory.
///
/// Sub-packages are copied by their own call; non-Python files only when
/// package data is included.
fn copy_package_files(
    source_root: &Path,
    artifact_dir: &Path,
    package: &str,
    include_package_data: bool,
) -> Result<(), DescriptorError> {
    let relative: PathBuf = package.split('.').collect();
    let from = source_root.join(&relative);
    let to = artifact_dir.join(&relative);
    fs::create_dir_all(&to)?;

    for entry in fs::read_dir(&from)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_python = path.extension().is_some_and(|ext| ext == "py");
        let is_bytecode = path.extension().is_some_and(|ext| ext == "pyc");
        if is_bytecode || (!is_python && !include_package_data) {
            continue;
        }
        fs::copy(&path, to.join(entry.file_name()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_api_module, write_package};
    use tempfile::TempDir;

    fn load(dir: &Path) -> Descriptor {
        let path = write_package(dir);
        Descriptor::load(&path).unwrap_or_else(|e| unreachable!("{e}"))
    }

    #[test]
    fn test_build_produces_single_named_artifact() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let descriptor = load(temp_dir.path());
        let out_dir = temp_dir.path().join("dist");

        let artifact = build(&descriptor, &out_dir, BuildOptions::default());
        assert!(artifact.is_ok(), "{:?}", artifact.err());
        let artifact = artifact.unwrap_or_else(|_| unreachable!());

        let produced: Vec<_> = fs::read_dir(&out_dir)
            .map(|entries| entries.flatten().collect())
            .unwrap_or_default();
        assert_eq!(produced.len(), 1);
        assert_eq!(artifact.metadata.name, "bellande_motion_probability");
        assert_eq!(artifact.metadata.version, "0.1.0");
        assert_eq!(artifact.console_scripts().len(), 1);
        assert_eq!(artifact.top_level, vec!["bellande_motion_probability"]);
        assert!(artifact
            .path
            .join("bellande_motion_probability/__init__.py")
            .is_file());
        // package data is included by the test descriptor
        assert!(artifact
            .path
            .join("bellande_motion_probability/defaults.json")
            .is_file());
    }

    #[test]
    fn test_rebuild_replaces_stale_artifact() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let descriptor = load(temp_dir.path());
        let out_dir = temp_dir.path().join("dist");

        assert!(build(&descriptor, &out_dir, BuildOptions::default()).is_ok());
        let stale = out_dir
            .join(descriptor.artifact_name())
            .join("leftover.txt");
        fs::write(&stale, "old").ok();
        assert!(build(&descriptor, &out_dir, BuildOptions::default()).is_ok());
        assert!(!stale.exists());
    }

    #[test]
    fn test_strict_build_requires_entry_point_module() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let descriptor = load(temp_dir.path());
        let out_dir = temp_dir.path().join("dist");

        let strict = BuildOptions { strict: true };
        assert!(matches!(
            build(&descriptor, &out_dir, strict),
            Err(DescriptorError::EntryPointNotFound { .. })
        ));
        assert!(!out_dir.exists());

        write_api_module(temp_dir.path());
        assert!(build(&descriptor, &out_dir, strict).is_ok());
    }

    #[test]
    fn test_missing_readme_aborts_before_output() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let descriptor = load(temp_dir.path());
        fs::remove_file(temp_dir.path().join("README.md")).ok();
        let out_dir = temp_dir.path().join("dist");

        assert!(matches!(
            build(&descriptor, &out_dir, BuildOptions::default()),
            Err(DescriptorError::ReadmeNotFound(_))
        ));
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_empty_source_root_aborts() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let descriptor = load(temp_dir.path());
        fs::remove_dir_all(temp_dir.path().join("src/bellande_motion_probability")).ok();

        assert!(matches!(
            build(&descriptor, &temp_dir.path().join("dist"), BuildOptions::default()),
            Err(DescriptorError::NoPackagesFound(_))
        ));
    }

    #[test]
    fn test_open_rejects_non_artifact() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        assert!(matches!(
            BuiltArtifact::open(temp_dir.path()),
            Err(DescriptorError::InvalidArtifact(_))
        ));
    }
}
