//! Package discovery under a source root
//!
//! A directory is a package when it holds an `__init__.py`. Sub-packages are
//! only found beneath packages, so a stray directory stops the descent.

use crate::errors::DescriptorError;
use crate::types::EntryPoint;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

pub const PACKAGE_MARKER: &str = "__init__.py";

fn is_package_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && is_identifier(&entry.file_name().to_string_lossy())
        && entry.path().join(PACKAGE_MARKER).is_file()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn dotted_name(root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

/// Find every package under `source_root`, sorted by dotted name.
///
/// An empty result is an error: building from it would produce an artifact
/// with nothing to import.
pub fn discover_packages(source_root: &Path) -> Result<Vec<String>, DescriptorError> {
    let packages = find_packages(source_root)?;
    if packages.is_empty() {
        return Err(DescriptorError::NoPackagesFound(source_root.to_path_buf()));
    }
    info!(
        "Discovered {} packages under {}",
        packages.len(),
        source_root.display()
    );
    Ok(packages)
}

/// Like [`discover_packages`] but an empty result is not an error
pub fn find_packages(source_root: &Path) -> Result<Vec<String>, DescriptorError> {
    if !source_root.is_dir() {
        return Err(DescriptorError::SourceRootMissing(source_root.to_path_buf()));
    }

    let mut packages = Vec::new();
    let walker = WalkDir::new(source_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || is_package_dir(e));

    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            continue;
        }
        if let Some(name) = dotted_name(source_root, entry.path()) {
            debug!("Found package: {}", name);
            packages.push(name);
        }
    }

    packages.sort();
    Ok(packages)
}

/// Top-level package names (no dots) from a discovered list
pub fn top_level_packages(packages: &[String]) -> Vec<String> {
    let mut top: Vec<String> = packages
        .iter()
        .filter(|p| !p.contains('.'))
        .cloned()
        .collect();
    top.sort();
    top.dedup();
    top
}

/// Locate the file defining a dotted module: `a/b.py` or `a/b/__init__.py`
pub fn find_module_file(root: &Path, module: &str) -> Option<PathBuf> {
    let relative: PathBuf = module.split('.').collect();
    let as_file = root.join(&relative).with_extension("py");
    if as_file.is_file() {
        return Some(as_file);
    }
    let as_package = root.join(&relative).join(PACKAGE_MARKER);
    if as_package.is_file() {
        return Some(as_package);
    }
    None
}

/// Whether module source defines the top-level name an entry point calls
fn defines_callable(source: &str, callable: &str) -> bool {
    let head = callable.split('.').next().unwrap_or(callable);
    source.lines().any(|line| {
        let line = line.trim_end();
        line.starts_with(&format!("def {}(", head))
            || line.starts_with(&format!("async def {}(", head))
            || line.starts_with(&format!("class {}", head))
            || line.starts_with(&format!("{} =", head))
            || line.starts_with(&format!("{}=", head))
    })
}

/// Check that an entry point's target exists under `root`.
///
/// The module file must exist and define the callable's top-level name.
pub fn verify_entry_point(root: &Path, entry: &EntryPoint) -> Result<PathBuf, DescriptorError> {
    let module_file =
        find_module_file(root, &entry.module).ok_or_else(|| DescriptorError::EntryPointNotFound {
            target: entry.target(),
            reason: format!("module '{}' not found under {}", entry.module, root.display()),
        })?;

    let source = fs::read_to_string(&module_file)?;
    if !defines_callable(&source, &entry.callable) {
        return Err(DescriptorError::EntryPointNotFound {
            target: entry.target(),
            reason: format!(
                "'{}' is not defined in {}",
                entry.callable,
                module_file.display()
            ),
        });
    }
    Ok(module_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CONSOLE_SCRIPTS;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        fs::write(path, content).ok();
    }

    fn console(module: &str) -> EntryPoint {
        EntryPoint {
            group: CONSOLE_SCRIPTS.to_string(),
            name: "api".to_string(),
            module: module.to_string(),
            callable: "main".to_string(),
        }
    }

    #[test]
    fn test_discover_nested_packages() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();
        touch(&root.join("bellande_motion_probability/__init__.py"), "");
        touch(&root.join("bellande_motion_probability/models/__init__.py"), "");
        // Not a package: no marker, and its child is unreachable
        touch(&root.join("scripts/tools/__init__.py"), "");
        touch(&root.join("bellande_motion_probability/data/table.csv"), "x,y\n");

        let packages = discover_packages(root).unwrap_or_default();
        assert_eq!(
            packages,
            vec![
                "bellande_motion_probability".to_string(),
                "bellande_motion_probability.models".to_string(),
            ]
        );
        assert_eq!(
            top_level_packages(&packages),
            vec!["bellande_motion_probability".to_string()]
        );
    }

    #[test]
    fn test_empty_source_root_fails_loudly() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        touch(&temp_dir.path().join("notes.txt"), "nothing to import");
        assert!(matches!(
            discover_packages(temp_dir.path()),
            Err(DescriptorError::NoPackagesFound(_))
        ));
        assert!(find_packages(temp_dir.path()).is_ok_and(|p| p.is_empty()));
    }

    #[test]
    fn test_missing_source_root() {
        assert!(matches!(
            discover_packages(Path::new("/tmp/no_such_bellande_src_root")),
            Err(DescriptorError::SourceRootMissing(_))
        ));
    }

    #[test]
    fn test_find_module_file_variants() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();
        touch(&root.join("pkg/__init__.py"), "");
        touch(&root.join("pkg/api.py"), "def main():\n    pass\n");

        assert!(find_module_file(root, "pkg.api").is_some_and(|p| p.ends_with("pkg/api.py")));
        assert!(find_module_file(root, "pkg").is_some_and(|p| p.ends_with("pkg/__init__.py")));
        assert!(find_module_file(root, "pkg.missing").is_none());
    }

    #[test]
    fn test_verify_entry_point() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();
        touch(&root.join("pkg/__init__.py"), "");
        touch(&root.join("pkg/api.py"), "import sys\n\ndef main():\n    return 0\n");
        touch(&root.join("pkg/empty.py"), "VALUE = 1\n");

        assert!(verify_entry_point(root, &console("pkg.api")).is_ok());
        assert!(matches!(
            verify_entry_point(root, &console("pkg.absent")),
            Err(DescriptorError::EntryPointNotFound { .. })
        ));
        assert!(matches!(
            verify_entry_point(root, &console("pkg.empty")),
            Err(DescriptorError::EntryPointNotFound { .. })
        ));
    }
}
