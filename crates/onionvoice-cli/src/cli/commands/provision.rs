//! `onionvoice provision` - Trust a server and mint a client certificate.

use anyhow::Result;
use colored::Colorize;

use onionvoice::{EmbedOutcome, PatchOutcome, ProvisionReport};

use super::Context;
use crate::cli::args::ProvisionArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: ProvisionArgs) -> Result<()> {
    let dir = ctx.require_client_dir(args.dir)?;
    let session = ctx.attached_session(&dir).await?;

    let spinner = output::spinner(
        ctx.output_format,
        "Fetching server certificate and generating keys...",
    );
    let report = session.provision(&args.address).await;
    spinner.finish_and_clear();
    let report = report?;

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Pretty => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &ProvisionReport) {
    println!("{} {}", "Server:".bold(), report.host.cyan().bold());
    println!();
    output::field("Port", &report.port);
    output::field("Digest", &report.digest);
    output::field("Database", describe_patch(report.database));
    output::field(
        "Config",
        match report.config {
            EmbedOutcome::Injected => "client certificate stored".green(),
            EmbedOutcome::TokenAbsent => "already has a client certificate".yellow(),
        },
    );
}

pub(super) fn describe_patch(outcome: PatchOutcome) -> colored::ColoredString {
    match outcome {
        PatchOutcome::Applied {
            host_replacements,
            digest_replacements,
        } => format!(
            "server stored ({host_replacements} host, {digest_replacements} digest replacements)"
        )
        .green(),
        PatchOutcome::AlreadyInstalled => "server already installed".yellow(),
    }
}
