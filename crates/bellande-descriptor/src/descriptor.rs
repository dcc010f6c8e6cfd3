//! Descriptor loading and validation

use crate::entry_points::parser::parse_entry_point_line;
use crate::errors::DescriptorError;
use crate::requirement::{is_valid_name, PythonRequirement, Requirement};
use crate::types::{Descriptor, EntryPoint, CONSOLE_SCRIPTS};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

impl Descriptor {
    /// Load a descriptor file and the README it references.
    ///
    /// A missing README is an error: the long description is part of the
    /// metadata and an artifact without it would be incomplete.
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        debug!("Loading descriptor from: {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DescriptorError::DescriptorNotFound(path.to_path_buf()),
            _ => DescriptorError::Io(e),
        })?;

        let mut descriptor = Self::from_toml_str(&content)?;
        descriptor.base_dir = Some(
            path.parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        );
        descriptor.package.long_description = descriptor.read_readme()?;

        info!(
            "Loaded descriptor for {} {}",
            descriptor.package.name, descriptor.package.version
        );
        Ok(descriptor)
    }

    /// Parse and validate descriptor text without touching the filesystem
    pub fn from_toml_str(content: &str) -> Result<Self, DescriptorError> {
        let descriptor: Descriptor = toml::from_str(content)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check every field a packaging tool would reject
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let package = &self.package;

        if !is_valid_name(&package.name) {
            return Err(DescriptorError::InvalidName(package.name.clone()));
        }

        semver::Version::parse(&package.version).map_err(|source| {
            DescriptorError::InvalidVersion {
                version: package.version.clone(),
                source,
            }
        })?;

        if let Some(ref requires_python) = package.requires_python {
            PythonRequirement::parse(requires_python)?;
        }

        for requirement in self.dependencies.all_requirements() {
            Requirement::parse(requirement)?;
        }

        for extra in self.dependencies.extras.keys() {
            if !is_valid_name(extra) {
                return Err(DescriptorError::InvalidRequirement(format!(
                    "extra name '{}'",
                    extra
                )));
            }
        }

        let entry_points = self.entry_points()?;
        let console_count = entry_points
            .iter()
            .filter(|ep| ep.group == CONSOLE_SCRIPTS)
            .count();
        if console_count != 1 {
            return Err(DescriptorError::InvalidEntryPoint(format!(
                "expected exactly one console script, found {}",
                console_count
            )));
        }

        Ok(())
    }

    /// All declared entry points, parsed
    pub fn entry_points(&self) -> Result<Vec<EntryPoint>, DescriptorError> {
        let mut parsed = Vec::new();
        for (group, entries) in &self.entry_points {
            for (name, target) in entries {
                let line = format!("{} = {}", name, target);
                let entry = parse_entry_point_line(&line, group).ok_or_else(|| {
                    DescriptorError::InvalidEntryPoint(format!("[{}] {}", group, line))
                })?;
                parsed.push(entry);
            }
        }
        Ok(parsed)
    }

    /// The single console command this distribution exposes
    pub fn console_script(&self) -> Result<EntryPoint, DescriptorError> {
        self.entry_points()?
            .into_iter()
            .find(|ep| ep.group == CONSOLE_SCRIPTS)
            .ok_or_else(|| DescriptorError::InvalidEntryPoint("no console script".to_string()))
    }

    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn source_root(&self) -> PathBuf {
        self.base_dir().join(&self.layout.source_root)
    }

    pub fn readme_path(&self) -> Option<PathBuf> {
        self.package
            .readme
            .as_ref()
            .map(|readme| self.base_dir().join(readme))
    }

    /// Read the README verbatim; descriptors without a README have an empty long description
    pub fn read_readme(&self) -> Result<String, DescriptorError> {
        let Some(path) = self.readme_path() else {
            return Ok(String::new());
        };
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DescriptorError::ReadmeNotFound(path),
            _ => DescriptorError::Io(e),
        })
    }

    /// `<name>-<version>`, the identity of a built artifact
    pub fn artifact_name(&self) -> String {
        crate::metadata_writer::artifact_name(&self.package.name, &self.package.version)
    }

    pub fn python_requirement(&self) -> Result<Option<PythonRequirement>, DescriptorError> {
        self.package
            .requires_python
            .as_deref()
            .map(PythonRequirement::parse)
            .transpose()
    }
}
