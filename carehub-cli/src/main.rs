//! CareHub CLI - Command-line front end for the access core
//!
//! Each invocation is one "page load": the saved session is restored from the
//! data directory, the command runs, and any change is written back.

mod commands;

use carehub_core::{
    config_error, init_logging, CareHubConfig, CareHubError, CareHubResult, ErrorContext,
};
use clap::{Parser, Subcommand};
use commands::CliContext;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "carehub")]
#[command(about = "Home-care administration: sign in and navigate by role")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Sign in with an account email
    Login {
        /// Account email (case-sensitive)
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Sign out of the current session
    Logout,

    /// Show who is signed in
    Whoami,

    /// List the menu entries available to the current user
    Menu,

    /// Navigate to a path and show what would be rendered
    Open {
        /// Path such as "/", "/pacientes" or "/login"
        path: String,
    },

    /// List every route and who may open it
    Routes,

    /// List the demo accounts offered on the login screen
    Accounts,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_path) = load_config(cli.config.as_ref())?;

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }

    init_logging(&logging_config).map_err(|e| CareHubError::Config {
        message: format!("Failed to initialize logging: {}", e),
        source: Some(e),
        context: ErrorContext::new("cli")
            .with_operation("init_logging")
            .with_suggestion("Check the [logging] section of your configuration"),
    })?;

    info!("Starting CareHub CLI v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => info!("No configuration file found, using defaults"),
    }

    if let Commands::Config {
        show,
        init,
        validate,
    } = cli.command
    {
        return handle_config(&config, show, init, validate);
    }

    config.validate().inspect_err(|e| e.log())?;
    let context = CliContext::from_config(&config)?;

    let mut stdout = std::io::stdout();
    commands::run(cli.command, &context, &mut stdout).await
}

fn load_config(
    config_path: Option<&PathBuf>,
) -> CareHubResult<(CareHubConfig, Option<PathBuf>)> {
    if let Some(path) = config_path {
        return Ok((CareHubConfig::from_file(path)?, Some(path.clone())));
    }

    let default_paths = [
        default_config_path(),
        dirs::home_dir().map(|d| d.join(".carehub").join("config.toml")),
        Some(PathBuf::from("carehub.toml")),
    ];

    for path in default_paths.into_iter().flatten() {
        if path.exists() {
            return Ok((CareHubConfig::from_file(&path)?, Some(path)));
        }
    }

    Ok((CareHubConfig::default(), None))
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("carehub").join("config.toml"))
}

fn handle_config(
    config: &CareHubConfig,
    show: bool,
    init: bool,
    validate: bool,
) -> anyhow::Result<()> {
    if init {
        let path = default_config_path()
            .ok_or_else(|| config_error!("Could not determine a configuration directory", "cli"))?;
        CareHubConfig::default().save_to_file(&path)?;
        println!("Configuration initialized at: {}", path.display());
    }

    if show {
        println!("{}", toml::to_string_pretty(config)?);
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => {
                println!("Configuration validation failed: {}", e);
                for suggestion in e.suggestions() {
                    println!("  hint: {}", suggestion);
                }
                return Err(e.into());
            }
        }
    }

    Ok(())
}
