//! Core metadata rendering and parsing
//!
//! Writes the `METADATA` file of a `.dist-info` directory (core metadata 2.1)
//! and reads the subset of headers the installer needs back out of it.

use crate::requirement::Requirement;
use crate::types::Descriptor;

pub const METADATA_VERSION: &str = "2.1";
pub const METADATA_FILE: &str = "METADATA";
pub const ENTRY_POINTS_FILE: &str = "entry_points.txt";
pub const TOP_LEVEL_FILE: &str = "top_level.txt";
pub const INSTALLER_FILE: &str = "INSTALLER";

/// File-system safe distribution name (`-` becomes `_`)
pub fn escape_name(name: &str) -> String {
    name.replace('-', "_")
}

/// `<name>-<version>`
pub fn artifact_name(name: &str, version: &str) -> String {
    format!("{}-{}", escape_name(name), version)
}

/// `<name>-<version>.dist-info`
pub fn dist_info_name(name: &str, version: &str) -> String {
    format!("{}.dist-info", artifact_name(name, version))
}

/// Render METADATA for a descriptor
pub fn render_metadata(descriptor: &Descriptor) -> String {
    let package = &descriptor.package;
    let mut out = String::new();
    let mut header = |key: &str, value: &str| {
        if !value.is_empty() {
            out.push_str(&format!("{}: {}\n", key, value));
        }
    };

    header("Metadata-Version", METADATA_VERSION);
    header("Name", &package.name);
    header("Version", &package.version);
    header("Summary", &package.description);
    if let Some(home) = descriptor.urls.get("Homepage").or_else(|| descriptor.urls.get("Home")) {
        header("Home-page", home);
    }
    header("Author", &package.author);
    header("Author-email", &package.author_email);

    let keywords: Vec<&str> = package.keywords.iter().map(String::as_str).collect();
    header("Keywords", &keywords.join(","));

    if let Some(ref license) = package.license {
        header("Classifier", license);
    }
    for classifier in &package.classifiers {
        header("Classifier", classifier);
    }
    if let Some(ref requires_python) = package.requires_python {
        header("Requires-Python", requires_python);
    }
    for (label, url) in &descriptor.urls {
        header("Project-URL", &format!("{}, {}", label, url));
    }

    for requirement in &descriptor.dependencies.runtime {
        header("Requires-Dist", &canonical(requirement));
    }
    for (extra, members) in &descriptor.dependencies.extras {
        header("Provides-Extra", extra);
        for requirement in members {
            header("Requires-Dist", &extra_requirement(requirement, extra));
        }
    }

    header("Description-Content-Type", &package.readme_content_type);

    out.push('\n');
    out.push_str(&package.long_description);
    out
}

fn canonical(requirement: &str) -> String {
    Requirement::parse(requirement)
        .map(|r| r.to_string())
        .unwrap_or_else(|_| requirement.trim().to_string())
}

/// Requirement line gated on an extra.
///
/// An existing environment marker is kept and combined with the extra clause,
/// so the line stays a single valid marker expression.
fn extra_requirement(requirement: &str, extra: &str) -> String {
    let clause = format!("extra == \"{}\"", extra);
    match Requirement::parse(requirement) {
        Ok(mut parsed) => {
            parsed.marker = Some(match parsed.marker.take() {
                Some(marker) => format!("({}) and {}", marker, clause),
                None => clause,
            });
            parsed.to_string()
        }
        Err(_) => format!("{}; {}", requirement.trim(), clause),
    }
}

/// Headers read back from an installed or built METADATA file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreMetadata {
    pub metadata_version: String,
    pub name: String,
    pub version: String,
    pub summary: String,
    pub requires_python: Option<String>,
    pub requires_dist: Vec<String>,
    pub provides_extra: Vec<String>,
    pub description: String,
}

/// Parse METADATA headers up to the first blank line; the rest is the description
pub fn parse_metadata(content: &str) -> CoreMetadata {
    let mut meta = CoreMetadata::default();
    let mut lines = content.lines();

    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "Metadata-Version" => meta.metadata_version = value,
            "Name" => meta.name = value,
            "Version" => meta.version = value,
            "Summary" => meta.summary = value,
            "Requires-Python" => meta.requires_python = Some(value),
            "Requires-Dist" => meta.requires_dist.push(value),
            "Provides-Extra" => meta.provides_extra.push(value),
            _ => {}
        }
    }

    meta.description = lines.collect::<Vec<_>>().join("\n");
    meta
}

/// One top-level package per line
pub fn render_top_level(top_level: &[String]) -> String {
    let mut out = top_level.join("\n");
    out.push('\n');
    out
}

pub fn parse_top_level(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
