//! Where the distribution descriptor comes from
//!
//! The shipped descriptor is compiled into the binaries so `show`, `resolve`
//! and the console command work without a source checkout. Commands that
//! need the README and the package sources read it from disk instead.

use crate::errors::CliError;
use bellande_descriptor::{Descriptor, EntryPoint};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

pub const DESCRIPTOR_FILE: &str = "bellande_motion_probability.toml";

pub const EMBEDDED_DESCRIPTOR: &str =
    include_str!("../../../package/bellande_motion_probability.toml");

static EMBEDDED: Lazy<Result<Descriptor, String>> = Lazy::new(|| {
    Descriptor::from_toml_str(EMBEDDED_DESCRIPTOR).map_err(|e| e.to_string())
});

/// The descriptor compiled into this binary
pub fn embedded() -> Result<&'static Descriptor, CliError> {
    EMBEDDED
        .as_ref()
        .map_err(|e| CliError::EmbeddedDescriptor(e.clone()))
}

/// The console script the embedded descriptor declares
pub fn console_script() -> Result<EntryPoint, CliError> {
    Ok(embedded()?.console_script()?)
}

/// Descriptor in the source tree this binary was built from
pub fn default_descriptor_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("package")
        .join(DESCRIPTOR_FILE)
}

/// Load from `path`, or the embedded copy when no path is given
pub fn load_or_embedded(path: Option<&Path>) -> Result<Descriptor, CliError> {
    match path {
        Some(path) => Ok(Descriptor::load(path)?),
        None => Ok(embedded()?.clone()),
    }
}

/// Load from disk, falling back to the source-tree descriptor
pub fn load_from_disk(path: Option<&Path>) -> Result<Descriptor, CliError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_descriptor_path);
    Ok(Descriptor::load(&path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellande_descriptor::DescriptorError;

    #[test]
    fn test_embedded_descriptor_is_valid() {
        let descriptor = embedded();
        assert!(descriptor.is_ok(), "{:?}", descriptor.err());
        let descriptor = descriptor.unwrap_or_else(|_| unreachable!());
        assert_eq!(descriptor.package.name, "bellande_motion_probability");
        assert_eq!(descriptor.package.version, "0.1.0");
    }

    #[test]
    fn test_console_script_target() {
        let entry = console_script();
        assert!(entry.is_ok_and(|ep| {
            ep.name == "bellande_motion_probability_api"
                && ep.target()
                    == "bellande_motion_probability.bellande_motion_probability_api:main"
        }));
    }

    #[test]
    fn test_source_tree_descriptor_loads() {
        let descriptor = load_from_disk(None);
        assert!(descriptor.is_ok_and(|d| !d.package.long_description.is_empty()));
    }

    #[test]
    fn test_missing_descriptor_path() {
        let result = load_or_embedded(Some(Path::new("/no/such/bellande.toml")));
        assert!(matches!(
            result,
            Err(CliError::Descriptor(DescriptorError::DescriptorNotFound(_)))
        ));
    }
}
