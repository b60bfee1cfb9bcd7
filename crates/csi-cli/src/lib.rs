pub mod cli;
pub mod config;
pub mod manifest;
pub mod pipeline;

pub use cli::{build_cli_command, Cli, Commands, RunArgs, DEFAULT_INPUT};
pub use config::{PipelineConfig, RenderConfig, TrimConfig};
pub use pipeline::{inspect_table, run_pipeline, PipelineReport};
