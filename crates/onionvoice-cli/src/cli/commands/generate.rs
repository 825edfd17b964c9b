//! `onionvoice generate` - Mint a self-signed client certificate.

use anyhow::Result;
use serde_json::json;

use onionvoice::identity;

use super::Context;
use crate::cli::args::GenerateArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: GenerateArgs) -> Result<()> {
    let spinner = output::spinner(ctx.output_format, "Generating RSA key...");

    if let (Some(cert), Some(key)) = (args.cert, args.key) {
        let (cert_out, key_out) = (cert.clone(), key.clone());
        let result =
            tokio::task::spawn_blocking(move || identity::generate_self_signed(&cert_out, &key_out))
                .await?;
        spinner.finish_and_clear();
        result?;

        match ctx.output_format {
            OutputFormat::Json => output::print_json(&json!({
                "certificate": cert,
                "private_key": key,
            }))?,
            OutputFormat::Pretty => {
                output::success("self-signed client certificate written");
                output::field("Certificate", cert.display());
                output::field("Private key", key.display());
            }
        }
        return Ok(());
    }

    let exporter = ctx.exporter();
    let result = tokio::task::spawn_blocking(move || identity::generate_client_literal(&exporter))
        .await?;
    spinner.finish_and_clear();
    let literal = result?;

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&json!({ "certificate": literal.as_str() }))?,
        OutputFormat::Pretty => println!("certificate={literal}"),
    }

    Ok(())
}
