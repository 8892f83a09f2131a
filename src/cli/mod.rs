//! Command-line interface for querysh
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Subcommands (`version`, `config`)
//! - Building the session for interactive mode

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::connection::{ConnectionManager, SqliteDriver};
use crate::error::Result;
use crate::repl::{CommandCompleter, ReedlineTerminal, Session, SessionConfig};

/// querysh - interactive SQL query shell
#[derive(Parser, Debug)]
#[command(
    name = "querysh",
    version,
    about = "Interactive SQL query shell",
    long_about = "An interactive SQL query shell printing result sets as aligned grids,
with parameter prompts, named query templates and CSV export."
)]
pub struct CliArgs {
    /// Database to open (SQLite file path or :memory:)
    #[arg(value_name = "DATABASE")]
    pub path: Option<String>,

    /// Database to open, as a flag
    #[arg(long, value_name = "PATH", conflicts_with = "path")]
    pub database: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Command timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Rows printed per result set (0 = all)
    #[arg(long, value_name = "N")]
    pub rows: Option<usize>,

    /// Maximum characters per column (0 = no truncation)
    #[arg(long, value_name = "N")]
    pub chars: Option<usize>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (errors only in the log)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Do not read or write the history file
    #[arg(long = "no-history")]
    pub no_history: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for querysh
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration, with argument overrides applied
    config: Config,
}

impl CliInterface {
    /// Parse the process arguments and load the configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build the interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// A file that fails validation is reported and replaced by defaults;
    /// a file that fails to parse is an error.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Override configuration values with the arguments that were given
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_connection_args(config, args);
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);

        if args.no_history {
            config.history.persist = false;
        }
    }

    fn apply_connection_args(config: &mut Config, args: &CliArgs) {
        if let Some(database) = args.path.as_ref().or(args.database.as_ref()) {
            config.connection.database = database.clone();
        }
        if let Some(timeout) = args.timeout {
            config.connection.timeout = timeout;
        }
    }

    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if let Some(rows) = args.rows {
            config.display.rows_to_print = rows;
        }
        if let Some(chars) = args.chars {
            config.display.column_display_width = chars;
        }
        if args.no_color {
            config.display.color_output = false;
        }
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn show_version(&self) {
        println!("querysh version {}", clap::crate_version!());
        println!("SQLite version: {}", rusqlite::version());
    }

    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }
        if show {
            self.show_config()?;
        }
        Ok(())
    }

    /// Report whether the configuration file parses and validates
    fn validate_config_file(&self) {
        let requested = self.args.config_file.as_deref();
        let Some(path) = Config::resolve_path(requested) else {
            println!(
                "No configuration file found ({})",
                requested
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| crate::config::DEFAULT_CONFIG_FILE.to_string())
            );
            return;
        };
        println!("Validating configuration file: {}", path.display());

        match Config::from_file(&path) {
            Ok(config) => match config.validate() {
                Ok(()) => println!("Configuration is valid"),
                Err(e) => println!("Configuration validation failed: {}", e),
            },
            Err(e) => println!("Failed to load configuration: {}", e),
        }
    }

    fn show_config(&self) -> Result<()> {
        match Config::resolve_path(self.args.config_file.as_deref()) {
            Some(path) => println!("# Configuration file: {}", path.display()),
            None => println!("# No configuration file, defaults in effect"),
        }
        println!();
        println!("{}", self.config.to_toml_string()?);
        Ok(())
    }

    /// Open the database named by the configuration and run the
    /// interactive session until the user leaves.
    pub fn run_session(&self) -> Result<()> {
        let driver = SqliteDriver::new(self.config.connection.database.clone());
        let connections = ConnectionManager::new(Box::new(driver), self.config.connection.timeout);
        let session_config = SessionConfig::from_config(&self.config);
        let completer = CommandCompleter::new(session_config.named_commands.names());
        let mut session = Session::new(connections, session_config);
        let mut terminal = ReedlineTerminal::new(&self.config.history, completer);
        session.run(&mut terminal)
    }
}
