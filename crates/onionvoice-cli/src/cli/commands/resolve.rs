//! `onionvoice resolve` - Split a server address into host and port.

use anyhow::Result;

use onionvoice::resolve;

use super::Context;
use crate::cli::args::ResolveArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: ResolveArgs) -> Result<()> {
    let address = resolve(&args.address)?;

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&address)?,
        OutputFormat::Pretty => {
            output::field("Host", address.host());
            output::field("Port", address.port());
        }
    }

    Ok(())
}
