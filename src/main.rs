/// Main entry point for the MonkPoint MCP server
///
/// This file loads configuration, sets up logging, parses command line arguments
/// and starts the MCP server. The server listens for JSON-RPC requests over
/// stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use monkpoint_mcp::{Config, MonkPointServer};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(".monkpoint")),
        dirs::data_dir().map(|p| p.join("monkpoint")),
        std::env::current_dir().ok().map(|p| p.join(".monkpoint")),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("monkpoint.db"));
            }
        }
    }

    let temp_path = std::env::temp_dir().join("monkpoint");
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path.join("monkpoint.db"))
}

/// Command line arguments for the MonkPoint MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses the config file value or a default location in the home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        config.logging.level.as_str()
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("monkpoint_mcp={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting MonkPoint MCP server");

    let db_path = match args.database.or_else(|| config.database.path.clone()) {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let server = MonkPointServer::new(db_path, config).await?;
    server.run().await?;

    info!("MonkPoint MCP server shutdown complete");
    Ok(())
}
