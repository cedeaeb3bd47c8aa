//! porttrack - ship tracking demo service
//!
//! Entry point for the porttrack application.

use clap::Parser;
use porttrack::cli::{Cli, Commands, ConfigCommands, ServeArgs};
use porttrack::config::Config;
use porttrack::error::exit_code;
use porttrack::PortTrackError;
use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is the normal case outside local development.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            tracing::error!(error = %e, "porttrack exited with error");
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Main application logic.
fn run(cli: &Cli) -> porttrack::Result<()> {
    match cli.command() {
        Commands::Serve(args) => cmd_serve(cli, &args),
        Commands::Config(subcmd) => cmd_config(cli, &subcmd),
    }
}

/// Handle the `serve` command.
fn cmd_serve(cli: &Cli, args: &ServeArgs) -> porttrack::Result<()> {
    let mut config = load_config(cli)?;

    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level_override() {
        config.logging.level = level.parse()?;
    }
    config.validate()?;

    porttrack::logging::init(&config)?;

    tracing::info!(
        service = %config.service.name,
        env = %config.service.env,
        bind = %config.server.bind,
        port = config.server.port,
        secret_configured = config.secrets.secret_id.is_some(),
        "Starting porttrack"
    );

    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        PortTrackError::server_with_source("Failed to create async runtime", e)
    })?;

    runtime.block_on(porttrack::serve(&config))
}

/// Handle the `config` subcommand.
fn cmd_config(cli: &Cli, subcmd: &ConfigCommands) -> porttrack::Result<()> {
    match subcmd {
        ConfigCommands::Validate => match load_config(cli) {
            Ok(_) => {
                println!("✓ Configuration is valid");
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid: {}", e);
                Err(e)
            }
        },
        ConfigCommands::Show => {
            let config = load_config(cli)?;
            let yaml = serde_yaml::to_string(&config).map_err(|e| {
                PortTrackError::config_with_source("Failed to serialize configuration", e)
            })?;
            println!("{}", yaml);
            Ok(())
        }
    }
}

/// Load configuration with error handling.
fn load_config(cli: &Cli) -> porttrack::Result<Config> {
    Config::load(cli.config.as_deref())
}
