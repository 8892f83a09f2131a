//! querysh - interactive SQL query shell
//!
//! Reads queries and `:` commands line by line, runs them against the
//! configured database and prints every result set as an aligned grid.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode against a SQLite file
//! querysh shop.db
//!
//! # Show the effective configuration
//! querysh config --show
//! ```

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use querysh::cli::CliInterface;
use querysh::error::Result;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the interactive session
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    cli.run_session()
}

/// Initialize logging to stderr.
///
/// `RUST_LOG` wins over the configured level when set.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
