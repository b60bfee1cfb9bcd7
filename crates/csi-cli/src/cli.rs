use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

/// Input read when no path is given on the command line.
pub const DEFAULT_INPUT: &str = "ca_csi_2020.zip";

#[derive(Parser, Debug)]
#[command(author, version, about = "Exploratory analysis of California Solar Initiative installations", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// TOML file overriding filter, trim and render settings
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Defaults to `run` with default arguments
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline and render every chart
    Run(RunArgs),
    /// Print the schema and categorical value counts of a table
    Inspect {
        /// Table to inspect (.csv, .parquet, .arrow/.ipc/.feather or .zip)
        #[arg(default_value = DEFAULT_INPUT, value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Table of CSI applications (.csv, .parquet, .arrow/.ipc/.feather or .zip)
    #[arg(default_value = DEFAULT_INPUT, value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Directory receiving the chart images and run manifest
    #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
    pub out_dir: PathBuf,

    /// Skip writing the run-<id>.json manifest
    #[arg(long)]
    pub no_manifest: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            out_dir: PathBuf::from("."),
            no_manifest: false,
        }
    }
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
