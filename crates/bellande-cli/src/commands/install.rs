//! Prefix-level commands: install, list, run and uninstall

use crate::config_manager::{Config, PrefixLayout};
use crate::errors::CliError;
use crate::logger;
use crate::registry::builtin_registry;
use bellande_descriptor::install::INSTALLER_NAME;
use bellande_descriptor::{
    install, list_installed, run_console_script, uninstall, InstallOptions,
};
use colored::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `--prefix` when given, else `install-prefix` from config
pub fn resolve_prefix(prefix: Option<&Path>) -> Result<PathBuf, CliError> {
    let prefix = match prefix {
        Some(prefix) => prefix.to_path_buf(),
        None => Config::load()?.install_prefix()?,
    };
    debug!("Using install prefix {}", prefix.display());
    Ok(prefix)
}

/// Launchers exec back into this binary
fn launcher_program() -> String {
    std::env::current_exe()
        .map(|exe| exe.display().to_string())
        .unwrap_or_else(|_| INSTALLER_NAME.to_string())
}

pub fn handle_install(
    artifact: &Path,
    prefix: Option<&Path>,
    extras: Vec<String>,
) -> Result<(), CliError> {
    if !artifact.exists() {
        return Err(CliError::ArtifactMissing(artifact.to_path_buf()));
    }
    let layout = PrefixLayout::new(resolve_prefix(prefix)?);
    let options = InstallOptions {
        extras,
        launcher_program: launcher_program(),
    };

    logger::spinner_start(&format!("Installing {}", artifact.display()));
    let installed = match install(artifact, &layout, &options) {
        Ok(installed) => installed,
        Err(e) => {
            logger::spinner_error("Install failed");
            return Err(e.into());
        }
    };
    logger::spinner_success(&format!(
        "Installed {} {} into {}",
        installed.name,
        installed.version,
        layout.root().display()
    ));

    for command in &installed.console_scripts {
        logger::info(&format!(
            "Command {} -> {}",
            command.cyan(),
            layout.launcher_path(command).display()
        ));
    }
    if !installed.requirements.is_empty() {
        logger::info(&format!(
            "Requirements: {}",
            installed.requirements.join(", ")
        ));
    }
    Ok(())
}

pub fn handle_list(prefix: Option<&Path>, as_json: bool) -> Result<(), CliError> {
    let layout = PrefixLayout::new(resolve_prefix(prefix)?);
    let installed = list_installed(&layout)?;

    if as_json {
        let value: Vec<_> = installed
            .iter()
            .map(|dist| {
                json!({
                    "name": dist.name,
                    "version": dist.version,
                    "extras": dist.extras,
                    "requirements": dist.requirements,
                    "console_scripts": dist.console_scripts,
                    "packages": dist.packages,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if installed.is_empty() {
        println!("{}", "No distributions installed".yellow());
        return Ok(());
    }

    for dist in &installed {
        println!("{} {}", dist.name.bold().green(), dist.version);
        if !dist.extras.is_empty() {
            println!("  {}: {}", "extras".cyan(), dist.extras.join(", "));
        }
        println!("  {}: {}", "packages".cyan(), dist.packages.join(", "));
        println!("  {}: {}", "commands".cyan(), dist.console_scripts.join(", "));
        if !dist.requirements.is_empty() {
            println!("  {}: {}", "requires".cyan(), dist.requirements.join(", "));
        }
    }
    Ok(())
}

/// Dispatch an installed command and return its exit status
pub fn handle_run(prefix: Option<&Path>, command: &str, args: &[String]) -> Result<i32, CliError> {
    let layout = PrefixLayout::open(&resolve_prefix(prefix)?)?;
    let registry = builtin_registry()?;
    logger::set_current_command(Some(command.to_string()));
    Ok(run_console_script(&layout, command, args, &registry)?)
}

pub fn handle_uninstall(prefix: Option<&Path>, name: &str) -> Result<(), CliError> {
    let layout = PrefixLayout::open(&resolve_prefix(prefix)?)?;
    let removed = uninstall(&layout, name)?;
    logger::success(&format!("Uninstalled {} {}", removed.name, removed.version));
    Ok(())
}
