use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use csi_cli::{Cli, Commands, PipelineConfig, RunArgs};

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    if let Err(err) = dispatch(&cli) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Inspect { input }) => commands::inspect::handle(input),
        Some(Commands::Completions { shell, out }) => {
            commands::completions::handle(*shell, out.as_deref())
        }
        Some(Commands::Run(args)) => run(cli, args),
        None => {
            info!("No command given; running the full analysis with defaults");
            run(cli, &RunArgs::default())
        }
    }
}

fn run(cli: &Cli, args: &RunArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref())?;
    commands::run::handle(args, &config)
}
