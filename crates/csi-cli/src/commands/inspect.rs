use std::io;
use std::path::Path;

use anyhow::Result;
use csi_cli::inspect_table;
use csi_io::read_frame;
use tracing::info;

pub fn handle(input: &Path) -> Result<()> {
    info!("Inspecting {}", input.display());
    let df = read_frame(input)?;
    inspect_table(&df, io::stdout())?;
    Ok(())
}
