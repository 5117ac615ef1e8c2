//! flight-search-mcp: MCP server for AI-assisted flight search
//!
//! Exposes flight, airport and airline search from the Amadeus API as MCP
//! tools over stdio or HTTP.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use flight_search_mcp::config::{self, Config};
use flight_search_mcp::flights::FlightService;
use flight_search_mcp::mcp::server::{McpServer, ServerInfo};
use flight_search_mcp::mcp::{http, StdioTransport};
use flight_search_mcp::provider::AmadeusClient;

/// How clients connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// One client over stdin/stdout.
    Stdio,
    /// Many clients over HTTP, one session each.
    Http,
}

/// MCP server for AI-assisted flight search.
///
/// Credentials and settings are read from the environment
/// (AMADEUS_CLIENT_ID, AMADEUS_CLIENT_SECRET, ...).
#[derive(Parser, Debug)]
#[command(name = "flight-search-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transport to serve on
    #[arg(short, long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// HTTP port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr: stdout belongs to the stdio transport.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Logs panics before the release profile aborts.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!(panic = %panic_info, "Fatal panic");
        default_hook(panic_info);
    }));
}

async fn serve(args: &Args, config: &Config) -> std::io::Result<()> {
    let client = AmadeusClient::new(config.amadeus_config())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let flights = Arc::new(FlightService::new(Arc::new(client), config.retry_policy()));

    match args.transport {
        Transport::Stdio => {
            let mut server = McpServer::new(ServerInfo::from(config), flights);
            let mut transport = StdioTransport::new();
            info!("MCP server ready on stdio, waiting for client connection...");
            server.run_stdio(&mut transport).await
        }
        Transport::Http => http::run(config, flights).await,
    }
}

/// Entry point for the flight-search-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let mut cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!("\nSet AMADEUS_CLIENT_ID and AMADEUS_CLIENT_SECRET to your API credentials.");
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = args.port {
        cfg.server.port = port;
    }

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);
    install_panic_hook();

    info!(
        version = %cfg.server.version,
        transport = ?args.transport,
        provider_url = cfg.base_url(),
        "Starting {}",
        cfg.server.name
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(serve(&args, &cfg)) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn parses_transport_and_port() {
        let args = Args::parse_from(["flight-search-mcp", "--transport", "http", "--port", "8080"]);
        assert_eq!(args.transport, Transport::Http);
        assert_eq!(args.port, Some(8080));

        let args = Args::parse_from(["flight-search-mcp"]);
        assert_eq!(args.transport, Transport::Stdio);
    }

    #[test]
    fn verbosity_overrides_config_level() {
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "bogus"), Level::INFO);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
        assert_eq!(get_log_level(3, true, "trace"), Level::ERROR);
    }
}
