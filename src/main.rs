//! Contact Signal CLI
//!
//! Command-line interface for the contact signal generator.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use contact_signal::cli::commands::{self, GenerateOptions};
use contact_signal::cli::{Cli, Commands};
use contact_signal::config::AppConfig;
use contact_signal::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Contact Signal v{}", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("[{}] {}", e.error_code(), e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let app = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Some(cmd) => handle_command(&app, cmd),
        None => {
            println!("Contact Signal v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(app: &AppConfig, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Generate {
            preset,
            config_json,
            music,
            duration,
            output,
            format,
            seed,
        } => commands::generate(
            app,
            GenerateOptions {
                preset,
                config_json,
                music,
                duration_ms: duration,
                output,
                format,
                seed,
            },
        ),
        Commands::Presets => commands::presets(),
        Commands::Preset { name } => commands::preset(&name),
        Commands::Waveform { file, points } => commands::waveform(app, &file, points),
        Commands::Info { file } => commands::info(app, &file),
        Commands::Tracks { dir } => commands::tracks(app, dir.as_deref()),
    }
}
