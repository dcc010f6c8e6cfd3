//! Configuration for the bellande_motion_probability tools
//!
//! Holds the user configuration file (API endpoint, local executable, install
//! prefix) and the directory layout of an install prefix.

pub mod config;
pub mod errors;
pub mod prefix_layout;

pub use config::Config;
pub use errors::ConfigError;
pub use prefix_layout::PrefixLayout;
