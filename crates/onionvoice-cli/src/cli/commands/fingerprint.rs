//! `onionvoice fingerprint` - SHA-1 digest of a server certificate.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use onionvoice::{decode_certificate, fingerprint, resolve, Fingerprint};

use super::{read_input, Context};
use crate::cli::args::FingerprintArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: FingerprintArgs) -> Result<()> {
    let (source, digest) = match (args.file, args.server) {
        (_, Some(server)) => {
            let address = resolve(&server)?;
            let spinner = output::spinner(ctx.output_format, "Fetching server certificate...");
            let identity = ctx.fetcher()?.fetch_identity(&address).await;
            spinner.finish_and_clear();
            (server, identity?.fingerprint)
        }
        (Some(file), None) => {
            let pem = read_input(Some(file.as_path()))?;
            (file.display().to_string(), digest_of(&pem)?)
        }
        (None, None) => anyhow::bail!("Pass a certificate file or --server <ADDRESS>"),
    };

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&json!({
            "source": source,
            "algorithm": Fingerprint::ALGORITHM,
            "fingerprint": digest,
        }))?,
        OutputFormat::Pretty => {
            if ctx.verbose {
                println!("{} {}", "Source:".bold(), source.cyan());
            }
            println!("{digest}");
        }
    }

    Ok(())
}

fn digest_of(pem: &[u8]) -> Result<Fingerprint> {
    Ok(fingerprint(&decode_certificate(pem)?))
}
