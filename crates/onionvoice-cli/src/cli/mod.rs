//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use onionvoice::TransportConfig;

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load()?;

    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    let ctx = commands::Context {
        output_format,
        verbose: cli.verbose > 0,
        transport: transport_config(&cli, &config),
        openssl: cli
            .openssl
            .clone()
            .or_else(|| config.openssl_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("openssl")),
        client_dir: config.client_dir()?,
    };
    debug!(
        output = %ctx.output_format,
        proxy = ?ctx.transport.proxy,
        openssl = %ctx.openssl.display(),
        "loaded configuration"
    );

    match cli.command {
        Commands::Init(args) => commands::init::execute(ctx, args).await,
        Commands::Provision(args) => commands::provision::execute(ctx, args).await,
        Commands::InstallServer(args) => commands::install_server::execute(ctx, args).await,
        Commands::Generate(args) => commands::generate::execute(ctx, args).await,
        Commands::Fingerprint(args) => commands::fingerprint::execute(ctx, args).await,
        Commands::Encode(args) => commands::encode::execute(ctx, args).await,
        Commands::Decode(args) => commands::decode::execute(ctx, args).await,
        Commands::Resolve(args) => commands::resolve::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args).await,
    }
}

/// Log to stderr. `-v` flags win over `RUST_LOG`; without either only
/// warnings are shown.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn transport_config(cli: &Cli, config: &Config) -> TransportConfig {
    let mut transport = TransportConfig::tor();

    if cli.no_proxy {
        transport.proxy = None;
    } else if let Some(proxy) = cli.proxy.as_ref().or(config.proxy.as_ref()) {
        transport.proxy = match proxy.as_str() {
            "" | "none" | "direct" => None,
            other => Some(other.to_string()),
        };
    }

    if let Some(secs) = cli.timeout.or(config.timeout_secs) {
        transport = transport.timeout(Duration::from_secs(secs));
    }

    transport
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("onionvoice").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_transport_defaults_to_tor() {
        let cli = parse(&["resolve", "mumble://host:1"]);
        let transport = transport_config(&cli, &Config::default());
        assert_eq!(transport, TransportConfig::tor());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = parse(&["--proxy", "socks5h://127.0.0.1:9150", "--timeout", "5", "resolve", "x"]);
        let config = Config {
            proxy: Some("none".into()),
            timeout_secs: Some(90),
            ..Config::default()
        };
        let transport = transport_config(&cli, &config);
        assert_eq!(transport.proxy.as_deref(), Some("socks5h://127.0.0.1:9150"));
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_can_disable_proxy() {
        let cli = parse(&["resolve", "x"]);
        let config = Config {
            proxy: Some("none".into()),
            ..Config::default()
        };
        assert!(transport_config(&cli, &config).proxy.is_none());
        assert!(transport_config(&parse(&["--no-proxy", "resolve", "x"]), &Config::default())
            .proxy
            .is_none());
    }
}
