//! `onionvoice config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&key, &value),
        ConfigCommands::Path => show_path(),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = Config::load()?;

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&config)?,
        OutputFormat::Pretty => {
            let unset = || "(not set)".dimmed().to_string();

            println!("{}", "Current Configuration:".bold());
            println!();
            output::field("proxy", config.proxy.clone().unwrap_or_else(unset));
            output::field(
                "timeout_secs",
                config.timeout_secs.map_or_else(unset, |t| t.to_string()),
            );
            output::field("openssl_path", config.openssl_path.clone().unwrap_or_else(unset));
            output::field("client_dir", config.client_dir.clone().unwrap_or_else(unset));
            output::field(
                "output_format",
                config.output_format.unwrap_or_default(),
            );
        }
    }

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    output::success(format!("{} set to {}.", key.bold(), value.cyan()));
    Ok(())
}

fn show_path() -> Result<()> {
    let path = Config::path()?;
    println!("{}", path.display());
    Ok(())
}
