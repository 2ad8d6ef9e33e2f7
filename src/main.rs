//! spacetrack-mcp: MCP server for Space-Track orbital data
//!
//! This tool lets AI assistants retrieve two-line element sets from
//! Space-Track.org and propagate them to arbitrary times with SGP4.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use spacetrack_mcp::catalog::CatalogClient;
use spacetrack_mcp::config::{self, Credentials};
use spacetrack_mcp::mcp::server::McpServer;

/// MCP server for Space-Track orbital data.
///
/// Reads Space-Track credentials from the `SPACE_TRACK_USERNAME` and
/// `SPACE_TRACK_PASSWORD` environment variables, which may also be set in a
/// `.env` file.
#[derive(Parser, Debug)]
#[command(name = "spacetrack-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Environment file with Space-Track credentials (default: `.env` if present)
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries protocol messages only.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the spacetrack-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig read from: {}", default_path.display());
                    eprintln!("See config/example-config.json for the accepted fields");
                }
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "spacetrack-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting spacetrack-mcp server"
    );

    let credentials = match args.env_file.as_deref() {
        Some(path) => Credentials::from_env_file(path),
        None => {
            config::load_dotenv();
            Credentials::from_env()
        }
    };
    let credentials = match credentials {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "Space-Track credentials unavailable");
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        base_url = %cfg.catalog.base_url,
        username = credentials.username(),
        "Space-Track catalog configured"
    );

    let catalog = CatalogClient::new(credentials, &cfg.catalog);
    let mut server = McpServer::new(catalog);

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

    if cfg.catalog.login_on_startup {
        if let Err(e) = runtime.block_on(server.connect()) {
            error!(error = %e, "Space-Track login failed");
            runtime.block_on(server.shutdown());
            return ExitCode::FAILURE;
        }
        info!("Logged in to Space-Track");
    }

    info!("MCP server ready, waiting for client connection...");

    let result = runtime.block_on(server.run());
    runtime.block_on(server.shutdown());

    match result {
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
