//! Fixtures shared by unit tests

use std::fs;
use std::path::{Path, PathBuf};

pub const DESCRIPTOR_TOML: &str = include_str!("../../../package/bellande_motion_probability.toml");

pub const README: &str = "# Bellande Motion Probability\n\nParticle motion probabilities.\n";

/// Lay out a package tree under `dir` and return the descriptor path
pub fn write_package(dir: &Path) -> PathBuf {
    write_package_with(dir, DESCRIPTOR_TOML)
}

/// Same tree as [`write_package`] with custom descriptor text
pub fn write_package_with(dir: &Path, descriptor: &str) -> PathBuf {
    let descriptor_path = dir.join("bellande_motion_probability.toml");
    let package_dir = dir.join("src").join("bellande_motion_probability");
    fs::create_dir_all(package_dir.join("models")).ok();

    fs::write(&descriptor_path, descriptor).ok();
    fs::write(dir.join("README.md"), README).ok();
    fs::write(package_dir.join("__init__.py"), "__version__ = \"0.1.0\"\n").ok();
    fs::write(package_dir.join("defaults.json"), "{\"search_radius\": 50.0}\n").ok();
    fs::write(package_dir.join("models").join("__init__.py"), "").ok();
    descriptor_path
}

/// Provide the module the console script points at
pub fn write_api_module(dir: &Path) {
    let module = dir
        .join("src")
        .join("bellande_motion_probability")
        .join("bellande_motion_probability_api.py");
    fs::write(module, "import sys\n\n\ndef main():\n    return 0\n").ok();
}
