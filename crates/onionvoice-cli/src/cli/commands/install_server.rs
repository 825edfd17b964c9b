//! `onionvoice install-server` - Store a server's identity in the client database.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use onionvoice::PatchOutcome;

use super::provision::describe_patch;
use super::Context;
use crate::cli::args::ProvisionArgs;
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct InstallReport<'a> {
    host: &'a str,
    port: &'a str,
    digest: &'a str,
    database: PatchOutcome,
}

pub async fn execute(ctx: Context, args: ProvisionArgs) -> Result<()> {
    let dir = ctx.require_client_dir(args.dir)?;
    let session = ctx.attached_session(&dir).await?;

    let spinner = output::spinner(ctx.output_format, "Fetching server certificate...");
    let result = session.install_server_identity(&args.address).await;
    spinner.finish_and_clear();
    let (identity, outcome) = result?;

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&InstallReport {
            host: identity.address.host(),
            port: identity.address.port(),
            digest: identity.fingerprint.as_str(),
            database: outcome,
        })?,
        OutputFormat::Pretty => {
            println!("{} {}", "Server:".bold(), identity.address.host().cyan().bold());
            println!();
            output::field("Port", identity.address.port());
            output::field("Digest", &identity.fingerprint);
            output::field("Database", describe_patch(outcome));
        }
    }

    Ok(())
}
