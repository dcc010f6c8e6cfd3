//! Common types and utilities shared across modules

use crate::logger;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Set up the console logger and the `tracing` subscriber.
///
/// `RUST_LOG` wins over the verbosity flags when set. Safe to call twice;
/// the second subscriber install is ignored.
pub fn init_logging(opts: &GlobalOpts) {
    if let Err(e) = logger::init_with_verbosity(opts.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logger::verbosity_to_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_overrides_verbose() {
        let opts = GlobalOpts {
            quiet: true,
            verbose: 2,
        };
        assert_eq!(opts.verbosity_level(), 0);

        let opts = GlobalOpts {
            quiet: false,
            verbose: 2,
        };
        assert_eq!(opts.verbosity_level(), 2);
    }
}
