use bellande_motion_probability::{
    commands::{
        config::{self, ConfigAction},
        install, package,
    },
    common::init_logging,
    errors::CliError,
    logger, GlobalOpts,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bellande_dist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Build, install and run the bellande_motion_probability distribution",
    long_about = "bellande_dist reads the bellande_motion_probability descriptor, builds the \
                  distribution artifact, installs it into a prefix and dispatches its console commands."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    /// Descriptor file (default: the descriptor built into this binary)
    #[arg(long, global = true)]
    descriptor: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the distribution metadata
    Show,
    /// Validate the descriptor, README, packages and entry points
    Check {
        /// Fail when an entry point target is missing
        #[arg(long)]
        strict: bool,
    },
    /// Build the distribution artifact
    Build {
        /// Output directory for the artifact
        #[arg(long, default_value = "dist")]
        out_dir: PathBuf,
        /// Fail when an entry point target is missing
        #[arg(long)]
        strict: bool,
    },
    /// Print the dependency set for the requested extras
    Resolve {
        /// Optional dependency group to include (repeatable)
        #[arg(long = "extra")]
        extras: Vec<String>,
    },
    /// Install a built artifact into a prefix
    Install {
        /// Artifact directory produced by `build`
        artifact: PathBuf,
        /// Install prefix (default: install-prefix from config)
        #[arg(long)]
        prefix: Option<PathBuf>,
        /// Optional dependency group to install (repeatable)
        #[arg(long = "extra")]
        extras: Vec<String>,
    },
    /// List installed distributions
    List {
        #[arg(long)]
        prefix: Option<PathBuf>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run an installed console command; arguments after `--` are passed through
    Run {
        #[arg(long)]
        prefix: Option<PathBuf>,
        command: String,
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Remove an installed distribution
    Uninstall {
        name: String,
        #[arg(long)]
        prefix: Option<PathBuf>,
    },
    /// Configure bellande tools
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn fail(context: &str, e: CliError) -> ! {
    logger::error(&format!("{}: {}", context, e));
    logger::show_log_path();
    std::process::exit(e.exit_code());
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let descriptor = cli.descriptor.as_deref();
    let result = match cli.command {
        Commands::Show => package::handle_show(descriptor, &cli.global),
        Commands::Check { strict } => package::handle_check(descriptor, strict),
        Commands::Build { out_dir, strict } => package::handle_build(descriptor, &out_dir, strict),
        Commands::Resolve { extras } => package::handle_resolve(descriptor, &extras),
        Commands::Install {
            artifact,
            prefix,
            extras,
        } => install::handle_install(&artifact, prefix.as_deref(), extras),
        Commands::List { prefix, json } => install::handle_list(prefix.as_deref(), json),
        Commands::Run {
            prefix,
            command,
            args,
        } => match install::handle_run(prefix.as_deref(), &command, &args) {
            Ok(code) => std::process::exit(code),
            Err(e) => fail(&format!("Run command '{}' failed", command), e),
        },
        Commands::Uninstall { name, prefix } => install::handle_uninstall(prefix.as_deref(), &name),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        fail("Command failed", e);
    }
}
