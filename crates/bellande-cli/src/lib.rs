//! bellande_motion_probability library - expose modules for the binaries and tests
//!
//! Two binaries are built from this crate: `bellande_motion_probability_api`,
//! the console command the distribution declares, and `bellande_dist`, the
//! tool that builds, installs and runs the distribution.

pub mod commands;
pub mod common;
pub mod descriptor_source;
pub mod errors;
pub mod motion_api;
pub mod registry;

pub use bellande_config as config_manager;
pub use bellande_logger as logger;
pub use common::GlobalOpts;
