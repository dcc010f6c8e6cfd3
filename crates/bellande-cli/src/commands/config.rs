use crate::config_manager::config::SUPPORTED_KEYS;
use crate::config_manager::{Config, ConfigError};
use crate::errors::CliError;
use crate::logger;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::*;
use std::fs;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Set a configuration value
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, later runs read the config from that path.
    /// If omitted, the current configuration file path is printed.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), CliError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
            println!("  {}: {}", "api-url (effective)".dimmed(), config.api_url());
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            if let Err(e) = config.set(&key, value.clone()) {
                logger::debug(&format!("Supported keys: {}", SUPPORTED_KEYS.join(", ")));
                return Err(e.into());
            }
            config.save()?;
            logger::success(&format!("Set {} = {}", key, value));
            Ok(())
        }
        ConfigAction::Path { new_path } => {
            let config_path = Config::path();
            logger::debug(&format!("Reading config from: {}", config_path.display()));

            match new_path {
                Some(p) => {
                    let Some(pointer_path) = Config::pointer_path() else {
                        return Err(ConfigError::NoHomeDir.into());
                    };
                    if let Some(parent) = pointer_path.parent() {
                        fs::create_dir_all(parent)
                            .map_err(ConfigError::from)?;
                    }
                    fs::write(&pointer_path, p.as_bytes())
                        .map_err(ConfigError::from)?;
                    logger::success(&format!("Config path set to {}", p));
                }
                None => {
                    println!("{}", config_path.display());
                    if let Some(pointer_path) = Config::pointer_path() {
                        if let Ok(contents) = fs::read_to_string(&pointer_path) {
                            let trimmed = contents.trim();
                            if !trimmed.is_empty() {
                                println!("{} {}", "overridden-by".cyan(), trimmed);
                            }
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
