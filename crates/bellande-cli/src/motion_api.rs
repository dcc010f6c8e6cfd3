//! The `bellande_motion_probability_api` console command

use crate::common::{init_logging, GlobalOpts};
use crate::config_manager::Config;
use crate::logger;
use anyhow::Context;
use bellande_motion::executable::{locate_executable, run_executable};
use bellande_motion::types::{DEFAULT_SAMPLE_POINTS, DEFAULT_SEARCH_RADIUS};
use bellande_motion::{MotionClient, MotionRequest, ReqwestTransport};
use clap::Parser;

pub const API_COMMAND: &str = "bellande_motion_probability_api";

#[derive(Parser, Debug, Clone)]
#[command(name = API_COMMAND)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Run Bellande Motion Probability",
    long_about = "Computes particle motion probabilities with Bellande distributions, \
                  either through the hosted API or a local Bellande_Motion_Probability executable."
)]
pub struct ApiCli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Current particle state as JSON list [x, y, heading, weight]
    #[arg(long)]
    pub particle_state: String,

    /// Previous pose as JSON list [x, y, heading]
    #[arg(long)]
    pub previous_pose: String,

    /// Current pose as JSON list [x, y, heading]
    #[arg(long)]
    pub current_pose: String,

    /// Noise parameters as JSON object {trans_sigma, rot_sigma, head_sigma}
    #[arg(long)]
    pub noise_params: Option<String>,

    /// Search radius for motion probability
    #[arg(long, default_value_t = DEFAULT_SEARCH_RADIUS)]
    pub search_radius: f64,

    /// Number of sample points
    #[arg(long, default_value_t = DEFAULT_SAMPLE_POINTS)]
    pub sample_points: u32,

    /// Run the local executable instead of calling the API
    #[arg(long)]
    pub use_executable: bool,

    /// API endpoint (default: api-url from config, then the hosted API)
    #[arg(long, conflicts_with = "use_executable")]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, conflicts_with = "use_executable", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl ApiCli {
    fn request(&self) -> Result<MotionRequest, bellande_motion::MotionError> {
        MotionRequest::from_json_args(
            &self.particle_state,
            &self.previous_pose,
            &self.current_pose,
            self.noise_params.as_deref(),
            self.search_radius,
            self.sample_points,
        )
    }
}

/// Run one query and print the result to stdout
pub fn run_api(cli: &ApiCli) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        logger::warn(&format!("Failed to load config, using defaults: {}", e));
        Config::default()
    });

    let request = cli.request().context("Invalid motion input")?;

    if cli.use_executable {
        let executable = locate_executable(config.executable_path().as_deref())?;
        logger::debug(&format!("Using executable: {}", executable.display()));
        let output = run_executable(&executable, &request)
            .with_context(|| format!("Failed to run {}", executable.display()))?;
        print!("{}", output);
        return Ok(());
    }

    let url = cli.url.as_deref().unwrap_or_else(|| config.api_url());
    let timeout = cli.timeout.unwrap_or_else(|| config.timeout_secs());
    let client = MotionClient::new(ReqwestTransport::new(timeout)?, url);

    logger::spinner_start("Querying Bellande Motion Probability API");
    let response = match client.request(&request) {
        Ok(response) => {
            logger::spinner_stop();
            response
        }
        Err(e) => {
            logger::spinner_error("API request failed");
            return Err(e).with_context(|| format!("Request to {} failed", client.url()));
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Entry function bound to the console script; `argv[0]` is the command name
pub fn entry(argv: &[String]) -> i32 {
    let cli = match ApiCli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return e.exit_code();
        }
    };

    init_logging(&cli.global);
    logger::set_current_command(Some(API_COMMAND.to_string()));

    match run_api(&cli) {
        Ok(()) => 0,
        Err(e) => {
            logger::error(&format!("{:#}", e));
            1
        }
    }
}
