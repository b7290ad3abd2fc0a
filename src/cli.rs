use crate::domain::constants::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "brainviset",
    version,
    about = "Iterative activity/attenuation map refinement for simulated brain PET"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_CONFIG_FILE,
        help = "Run configuration (TOML)"
    )]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare the run directory, build the initial maps and iterate to convergence
    Run {
        #[arg(
            long,
            allow_negative_numbers = true,
            help = "Override params.maximum_iteration"
        )]
        max_iterations: Option<i64>,
        #[arg(long, default_value_t = false, help = "Overwrite an existing run without asking")]
        yes: bool,
    },
    /// Resolve the configuration and print the run layout without touching disk
    Check,
}
