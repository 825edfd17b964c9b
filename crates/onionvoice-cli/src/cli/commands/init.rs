//! `onionvoice init` - Write fresh templates into a client directory.

use anyhow::{Context as _, Result};
use colored::Colorize;

use super::Context;
use crate::cli::args::InitArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: InitArgs) -> Result<()> {
    let dir = ctx.require_client_dir(args.dir)?;

    let database = std::fs::read(&args.database)
        .with_context(|| format!("Failed to read database template {}", args.database.display()))?;
    let config = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read config template {}", args.config.display()))?;

    let session = ctx.session()?;
    let layout = session.initialize(&dir, database, config).await?;

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&layout)?,
        OutputFormat::Pretty => {
            output::success(format!("client initialized in {}", dir.display().to_string().cyan()));
            output::field("Database", layout.database.display());
            output::field("Config", layout.config_file.display());
        }
    }

    Ok(())
}
