//! `onionvoice decode` - Turn an `@ByteArray(...)` literal back into bytes.

use anyhow::{Context as _, Result};
use serde_json::json;
use std::io::Write;

use onionvoice::ByteArrayLiteral;

use super::{read_input, Context};
use crate::cli::args::DecodeArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: DecodeArgs) -> Result<()> {
    let text = match args.literal {
        Some(literal) => literal,
        None => String::from_utf8(read_input(None)?).context("Literal is not valid UTF-8")?,
    };
    // Accept a whole `certificate=...` ini line as well as the bare literal.
    let text = text.trim();
    let text = text.strip_prefix("certificate=").unwrap_or(text);

    let bytes = ByteArrayLiteral::parse(text)?.decode()?;

    if let Some(path) = &args.out_file {
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if ctx.output_format == OutputFormat::Json {
            output::print_json(&json!({ "bytes": bytes.len(), "path": path }))?;
        } else {
            output::success(format!("{} bytes written to {}", bytes.len(), path.display()));
        }
        return Ok(());
    }

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&json!({ "bytes": bytes }))?,
        OutputFormat::Pretty => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
