/// Main entry point for the Saturn Planner MCP server
///
/// This file sets up logging, reads configuration and command line arguments,
/// and starts the MCP server. The server listens for JSON-RPC requests over
/// stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use saturn_planner::{PlannerConfig, PlannerServer};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(".saturn_planner")),
        dirs::data_dir().map(|p| p.join("saturn-planner")),
        dirs::config_dir().map(|p| p.join("saturn-planner")),
        std::env::current_dir().ok().map(|p| p.join(".saturn_planner")),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Make sure the directory is actually writable
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("planner.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let temp_path = std::env::temp_dir().join("saturn-planner");
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path.join("planner.db"))
}

/// Command line arguments for the Saturn Planner MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses the config file value or a default location
    #[arg(long)]
    database: Option<PathBuf>,

    /// Path to a TOML config file (default: <config dir>/saturn-planner/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// User whose habits and tasks are served (overrides the config file)
    #[arg(long)]
    user: Option<String>,

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

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    // RUST_LOG wins over the flags when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("saturn_planner={}", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting Saturn Planner MCP server");

    let mut config = PlannerConfig::load(args.config.as_deref())?;
    if let Some(user) = args.user {
        config.user_id = user;
    }
    if let Some(database) = args.database {
        config.database = Some(database);
    }
    config.validate()?;

    let db_path = match config.database.clone() {
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

    let server = PlannerServer::new(db_path, config).await?;

    // Handles JSON-RPC over stdin/stdout until stdin closes
    server.run().await?;

    info!("Saturn Planner MCP server shutdown complete");
    Ok(())
}
