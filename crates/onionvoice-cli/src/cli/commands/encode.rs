//! `onionvoice encode` - Render bytes as an `@ByteArray(...)` literal.

use anyhow::Result;
use serde_json::json;

use onionvoice::ByteArrayLiteral;

use super::{read_input, Context};
use crate::cli::args::EncodeArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: EncodeArgs) -> Result<()> {
    let bytes = read_input(args.file.as_deref())?;
    let literal = ByteArrayLiteral::encode(&bytes);

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&json!({
            "bytes": bytes.len(),
            "literal": literal.as_str(),
        }))?,
        OutputFormat::Pretty => println!("{literal}"),
    }

    Ok(())
}
