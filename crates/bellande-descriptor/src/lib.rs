//! Bellande distribution descriptor
//!
//! Reads the TOML descriptor of the `bellande_motion_probability` distribution
//! and implements what a packaging tool does with it: validation, dependency
//! resolution with extras, package discovery, artifact builds, installs into a
//! prefix and console-script dispatch through a native entry point registry.

pub mod artifact;
pub mod descriptor;
pub mod entry_points;
pub mod errors;
pub mod install;
pub mod metadata_writer;
pub mod package_discovery;
pub mod requirement;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use artifact::{build, BuildOptions, BuiltArtifact};
pub use entry_points::{EntryFn, EntryPointRegistry};
pub use errors::DescriptorError;
pub use install::{
    install, list_installed, run_console_script, uninstall, InstallOptions, InstalledDistribution,
};
pub use requirement::{PythonRequirement, Requirement};
pub use resolve::{Origin, Resolution};
pub use types::{Descriptor, DependencySpec, EntryPoint, PackageLayout, PackageMetadata};
