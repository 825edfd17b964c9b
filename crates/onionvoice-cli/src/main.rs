//! onionvoice - provision a portable Mumble client for a Tor onion server.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    onionvoice_cli::run().await
}
