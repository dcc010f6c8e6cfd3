//! Integration tests for bellande_dist and bellande_motion_probability_api

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DIST: &str = "bellande_dist";
const API_COMMAND: &str = "bellande_motion_probability_api";
const ARTIFACT: &str = "bellande_motion_probability-0.1.0";

/// Isolated home, config file and install prefix per test
struct Harness {
    home: TempDir,
    config_path: PathBuf,
}

impl Harness {
    fn new() -> io::Result<Self> {
        let home = TempDir::new()?;
        let config_dir = home.path().join(".config").join("bellande");
        fs::create_dir_all(&config_dir)?;
        let config_path = config_dir.join("bellande.toml");
        Ok(Self { home, config_path })
    }

    fn root(&self) -> &Path {
        self.home.path()
    }

    fn prefix(&self) -> PathBuf {
        self.root().join("prefix")
    }

    fn out_dir(&self) -> PathBuf {
        self.root().join("dist")
    }

    fn dist(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("bellande_dist");
        cmd.env("HOME", self.root());
        cmd.env("BELLANDE_CONFIG", &self.config_path);
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn api(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("bellande_motion_probability_api");
        cmd.env("HOME", self.root());
        cmd.env("BELLANDE_CONFIG", &self.config_path);
        cmd
    }

    fn build(&self) -> PathBuf {
        self.dist()
            .arg("build")
            .arg("--out-dir")
            .arg(self.out_dir())
            .assert()
            .success();
        self.out_dir().join(ARTIFACT)
    }

    fn install(&self, extras: &[&str]) {
        let artifact = self.build();
        let mut cmd = self.dist();
        cmd.arg("install").arg(&artifact).arg("--prefix").arg(self.prefix());
        for extra in extras {
            cmd.args(["--extra", extra]);
        }
        cmd.assert().success();
    }
}

#[test]
fn test_version() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.dist()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(DIST));
}

#[test]
fn test_help() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.dist()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bellande_dist reads the"));
}

#[test]
fn test_invalid_command() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.dist().arg("invalid").assert().failure();
}

#[test]
fn test_show_embedded_descriptor() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.dist()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("bellande_motion_probability"))
        .stdout(predicate::str::contains("0.1.0"))
        .stdout(predicate::str::contains(API_COMMAND));
}

#[test]
fn test_check_lenient_and_strict() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.dist()
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("Entry point target not found"));
    env.dist().args(["check", "--strict"]).assert().code(127);
}

#[test]
fn test_resolve_extras() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.dist()
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("numpy"))
        .stdout(predicate::str::contains("pytest").not());
    env.dist()
        .args(["resolve", "--extra", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pytest-cov[all]"))
        .stdout(predicate::str::contains("black"));
    env.dist()
        .args(["resolve", "--extra", "gpu"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown extra 'gpu'"));
}

#[test]
fn test_missing_readme_fails_build() {
    let Ok(env) = Harness::new() else {
        return;
    };
    let package_dir = env.root().join("package");
    let Ok(()) = fs::create_dir_all(package_dir.join("src/bellande_motion_probability")) else {
        return;
    };
    let source = include_str!("../../../package/bellande_motion_probability.toml");
    fs::write(package_dir.join("bellande_motion_probability.toml"), source).ok();
    fs::write(
        package_dir.join("src/bellande_motion_probability/__init__.py"),
        "",
    )
    .ok();

    env.dist()
        .arg("--descriptor")
        .arg(package_dir.join("bellande_motion_probability.toml"))
        .arg("build")
        .arg("--out-dir")
        .arg(env.out_dir())
        .assert()
        .failure()
        .stderr(predicate::str::contains("README file not found"));
    assert!(!env.out_dir().exists());
}

#[test]
fn test_build_install_list() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.install(&[]);

    env.dist()
        .args(["list", "--json", "--prefix"])
        .arg(env.prefix())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bellande_motion_probability\""))
        .stdout(predicate::str::contains(API_COMMAND))
        .stdout(predicate::str::contains("numpy"))
        .stdout(predicate::str::contains("pytest").not());

    let launcher = env.prefix().join("bin").join(API_COMMAND);
    assert!(launcher.is_file());
}

#[test]
fn test_install_with_dev_extra() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.install(&["dev"]);

    let record = fs::read_to_string(env.prefix().join("installed.json")).unwrap_or_default();
    for name in ["numpy", "pytest", "pytest-cov", "mypy", "black"] {
        assert!(record.contains(name), "{} missing from {}", name, record);
    }
}

#[test]
fn test_run_without_api_module_fails() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.install(&[]);

    env.dist()
        .arg("run")
        .arg("--prefix")
        .arg(env.prefix())
        .arg(API_COMMAND)
        .args(["--", "--help"])
        .assert()
        .code(127)
        .stderr(predicate::str::contains("is not installed"));

    env.dist()
        .arg("run")
        .arg("--prefix")
        .arg(env.prefix())
        .arg("not_a_command")
        .assert()
        .code(127)
        .stderr(predicate::str::contains("Command not found"));
}

#[test]
#[cfg(unix)]
fn test_launcher_dispatches_through_dist() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.install(&[]);

    let launcher = env.prefix().join("bin").join(API_COMMAND);
    Command::new("sh")
        .arg(&launcher)
        .env("HOME", env.root())
        .env("BELLANDE_CONFIG", &env.config_path)
        .assert()
        .code(127)
        .stderr(predicate::str::contains("Entry point target not found"));
}

#[test]
fn test_uninstall() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.install(&[]);

    env.dist()
        .args(["uninstall", "bellande_motion_probability", "--prefix"])
        .arg(env.prefix())
        .assert()
        .success();
    assert!(!env.prefix().join("bin").join(API_COMMAND).exists());

    env.dist()
        .args(["uninstall", "bellande_motion_probability", "--prefix"])
        .arg(env.prefix())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn test_config_path_uses_env() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.dist()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bellande.toml"));
}

#[test]
fn test_config_set_and_show() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.dist()
        .args(["config", "set", "api-url", "http://localhost:8000/motion"])
        .assert()
        .success();
    env.dist()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"))
        .stdout(predicate::str::contains("http://localhost:8000/motion"));
    env.dist()
        .args(["config", "set", "cache-path", "x"])
        .assert()
        .failure();
}

#[test]
fn test_api_help_and_input_validation() {
    let Ok(env) = Harness::new() else {
        return;
    };
    env.api()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--particle-state"));

    env.api()
        .args([
            "--particle-state",
            "[0, 0, 0]",
            "--previous-pose",
            "[0, 0, 0]",
            "--current-pose",
            "[1, 1, 0]",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("4 components"));
}
