//! Command-line argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Provision a portable Mumble client for a Tor onion server
///
/// Fetches the server certificate through Tor, stores its digest in the
/// client database and embeds a freshly generated client certificate in
/// the client config.
#[derive(Parser, Debug)]
#[command(name = "onionvoice")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Proxy for outgoing requests (default: Tor on 127.0.0.1:9050)
    #[arg(long, env = "ONIONVOICE_PROXY", global = true)]
    pub proxy: Option<String>,

    /// Connect directly instead of through a proxy
    #[arg(long, global = true, conflicts_with = "proxy")]
    pub no_proxy: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ONIONVOICE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// openssl binary used for PKCS#12 export
    #[arg(long, env = "ONIONVOICE_OPENSSL", global = true)]
    pub openssl: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write fresh database and config templates into a client directory
    Init(InitArgs),

    /// Install the server identity and a client certificate in one go
    Provision(ProvisionArgs),

    /// Fetch a server certificate and store its digest in the client database
    InstallServer(ProvisionArgs),

    /// Generate a client certificate
    Generate(GenerateArgs),

    /// SHA-1 fingerprint of a PEM certificate file or a live server
    Fingerprint(FingerprintArgs),

    /// Encode bytes as an @ByteArray(...) literal
    Encode(EncodeArgs),

    /// Decode an @ByteArray(...) literal back to bytes
    Decode(DecodeArgs),

    /// Split a server address into host and port
    Resolve(ResolveArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Client directory commands
// ============================================================================

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Client directory, or the client binary inside it
    #[arg(short, long, env = "ONIONVOICE_CLIENT_DIR")]
    pub dir: Option<PathBuf>,

    /// Database template (`.mumble.sqlite` with placeholder server)
    #[arg(long)]
    pub database: PathBuf,

    /// Config template (`mumble.ini` with a #CERTIFICATE marker)
    #[arg(long)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Server address, e.g. mumble://<name>.onion:64738
    pub address: String,

    /// Client directory, or the client binary inside it
    #[arg(short, long, env = "ONIONVOICE_CLIENT_DIR")]
    pub dir: Option<PathBuf>,
}

// ============================================================================
// Inspection commands
// ============================================================================

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Write the PEM certificate here instead of printing a PKCS#12 literal
    #[arg(long, requires = "key")]
    pub cert: Option<PathBuf>,

    /// Write the PEM private key here
    #[arg(long, requires = "cert")]
    pub key: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct FingerprintArgs {
    /// PEM certificate file
    pub file: Option<PathBuf>,

    /// Fetch the certificate from this server address instead
    #[arg(long)]
    pub server: Option<String>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Input file (reads stdin if omitted)
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Literal to decode (reads stdin if omitted)
    pub literal: Option<String>,

    /// Write the decoded bytes to this file instead of stdout
    #[arg(long)]
    pub out_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Server address
    pub address: String,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}
