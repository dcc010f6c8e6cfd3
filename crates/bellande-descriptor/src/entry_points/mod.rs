//! Entry point handling
//!
//! - `entry_points.txt` parsing and rendering (the installed form)
//! - the native registry that binds `module:callable` targets to Rust functions

pub mod parser;
pub mod registry;

pub use registry::{EntryFn, EntryPointRegistry};
