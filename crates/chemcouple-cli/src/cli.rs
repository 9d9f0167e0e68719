use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "chemcouple CLI - Couples a transport state to a PHREEQC-compatible geochemistry engine and steps it through time.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the initial calculation and a number of coupled time steps.
    Run(RunArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the coupling configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the number of time steps after the initial calculation.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Override the time step length in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub dt: Option<f64>,

    /// Path of the CSV file receiving the final transport values.
    #[arg(short, long, default_value = "results.csv", value_name = "PATH")]
    pub output: PathBuf,

    /// Override the engine executable from the config file.
    #[arg(short, long, value_name = "PATH")]
    pub engine: Option<PathBuf>,

    /// Override the thermodynamic database from the config file.
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,
}
