//! Descriptor-level commands: show, check, build and resolve

use crate::descriptor_source::{load_from_disk, load_or_embedded};
use crate::errors::CliError;
use crate::logger;
use crate::GlobalOpts;
use bellande_descriptor::package_discovery::{discover_packages, verify_entry_point};
use bellande_descriptor::{build, BuildOptions, Descriptor, Origin};
use colored::*;
use std::path::Path;

pub fn handle_show(descriptor_path: Option<&Path>, opts: &GlobalOpts) -> Result<(), CliError> {
    let descriptor = load_or_embedded(descriptor_path)?;
    let package = &descriptor.package;

    println!("{} {}", package.name.bold().green(), package.version);
    println!("  {}", package.description);
    println!("  {}: {} <{}>", "author".cyan(), package.author, package.author_email);
    if let Some(ref license) = package.license {
        println!("  {}: {}", "license".cyan(), license);
    }
    if let Some(ref requires_python) = package.requires_python {
        println!("  {}: {}", "requires-python".cyan(), requires_python);
    }
    if !package.keywords.is_empty() {
        let keywords: Vec<&str> = package.keywords.iter().map(String::as_str).collect();
        println!("  {}: {}", "keywords".cyan(), keywords.join(", "));
    }

    println!("{}", "Dependencies:".bold());
    for requirement in &descriptor.dependencies.runtime {
        println!("  {}", requirement);
    }
    for (extra, requirements) in &descriptor.dependencies.extras {
        println!("  [{}] {}", extra.yellow(), requirements.join(", "));
    }

    println!("{}", "Entry points:".bold());
    for entry in descriptor.entry_points()? {
        println!("  {} = {} ({})", entry.name.cyan(), entry.target(), entry.group.dimmed());
    }

    if !descriptor.urls.is_empty() {
        println!("{}", "URLs:".bold());
        for (label, url) in &descriptor.urls {
            println!("  {}: {}", label, url);
        }
    }

    if opts.verbosity_level() > 0 {
        println!("{}", "Classifiers:".bold());
        for classifier in &package.classifiers {
            println!("  {}", classifier);
        }
    }
    Ok(())
}

/// Validate everything a build depends on without writing anything
pub fn handle_check(descriptor_path: Option<&Path>, strict: bool) -> Result<(), CliError> {
    let descriptor = load_from_disk(descriptor_path)?;
    logger::step(&format!(
        "Checking {} {}",
        descriptor.package.name, descriptor.package.version
    ));

    if let Some(requirement) = descriptor.python_requirement()? {
        logger::debug(&format!("Requires Python {}", requirement));
    }

    let source_root = descriptor.source_root();
    let packages = discover_packages(&source_root)?;
    logger::info(&format!(
        "Found {} package(s): {}",
        packages.len(),
        packages.join(", ")
    ));

    let mut unresolved = 0;
    for entry in descriptor.entry_points()? {
        match verify_entry_point(&source_root, &entry) {
            Ok(path) => logger::debug(&format!("{} -> {}", entry.target(), path.display())),
            Err(e) if strict => return Err(e.into()),
            Err(e) => {
                unresolved += 1;
                logger::warn(&e.to_string());
            }
        }
    }

    for extra in descriptor.dependencies.extra_names() {
        descriptor.dependencies.resolve(std::slice::from_ref(&extra))?;
    }

    if unresolved == 0 {
        logger::success("Descriptor is valid");
    } else {
        logger::success(&format!(
            "Descriptor is valid ({} entry point(s) unresolved)",
            unresolved
        ));
    }
    Ok(())
}

pub fn handle_build(
    descriptor_path: Option<&Path>,
    out_dir: &Path,
    strict: bool,
) -> Result<(), CliError> {
    let descriptor = load_from_disk(descriptor_path)?;

    logger::spinner_start(&format!("Building {}", descriptor.artifact_name()));
    match build(&descriptor, out_dir, BuildOptions { strict }) {
        Ok(artifact) => {
            logger::spinner_success(&format!("Built {}", artifact.path.display()));
            println!("{}", artifact.path.display());
            Ok(())
        }
        Err(e) => {
            logger::spinner_error("Build failed");
            Err(e.into())
        }
    }
}

pub fn handle_resolve(descriptor_path: Option<&Path>, extras: &[String]) -> Result<(), CliError> {
    let descriptor = load_or_embedded(descriptor_path)?;
    print_resolution(&descriptor, extras)
}

fn print_resolution(descriptor: &Descriptor, extras: &[String]) -> Result<(), CliError> {
    let resolution = descriptor.dependencies.resolve(extras)?;
    if resolution.is_empty() {
        println!("{}", "(no dependencies)".yellow());
        return Ok(());
    }
    for resolved in &resolution.requirements {
        let origin = match resolved.origin {
            Origin::Runtime => "runtime".to_string(),
            Origin::Extra(ref extra) => format!("extra:{}", extra),
        };
        println!("{} {}", resolved.requirement, format!("({})", origin).dimmed());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellande_descriptor::DescriptorError;
    use tempfile::TempDir;

    #[test]
    fn test_show_embedded() {
        assert!(handle_show(None, &GlobalOpts::default()).is_ok());
    }

    #[test]
    fn test_check_source_tree() {
        assert!(handle_check(None, false).is_ok());
        assert!(matches!(
            handle_check(None, true),
            Err(CliError::Descriptor(DescriptorError::EntryPointNotFound { .. }))
        ));
    }

    #[test]
    fn test_resolve_unknown_extra() {
        assert!(handle_resolve(None, &[]).is_ok());
        assert!(handle_resolve(None, &["dev".to_string()]).is_ok());
        assert!(matches!(
            handle_resolve(None, &["gpu".to_string()]),
            Err(CliError::Descriptor(DescriptorError::UnknownExtra { .. }))
        ));
    }

    #[test]
    fn test_build_source_tree() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        assert!(handle_build(None, temp_dir.path(), false).is_ok());
        assert!(temp_dir
            .path()
            .join("bellande_motion_probability-0.1.0")
            .is_dir());
    }
}
