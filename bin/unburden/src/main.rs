mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unburden_core::PermissionLevel;

#[derive(Parser)]
#[command(name = "unburden")]
#[command(about = "Personal agent that takes bills, noise and small decisions off your plate")]
#[command(long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize unburden configuration
    Onboard {
        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration status
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Run agent cycles over a JSON snapshot
    Run {
        /// Snapshot file: one cycle input object or an array of them
        #[arg(short, long)]
        input: PathBuf,

        /// How many times to run the snapshot(s)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        cycles: u32,

        /// Override the configured permission level for this run
        #[arg(short, long)]
        permission: Option<PermissionLevel>,

        /// Print the cycle outcome as JSON instead of the text report
        #[arg(long)]
        json: bool,

        /// Also write the rendered report to the reports directory
        #[arg(long)]
        save: bool,
    },

    /// Run cycles over a snapshot and print freedom metrics
    Metrics {
        /// Snapshot file: one cycle input object or an array of them
        #[arg(short, long)]
        input: PathBuf,

        /// How many times to run the snapshot(s)
        #[arg(short, long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..))]
        cycles: u32,

        /// Override the configured permission level for this run
        #[arg(short, long)]
        permission: Option<PermissionLevel>,

        /// Print metrics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Print the config file path
    Path,
    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Onboard { force } => {
            commands::onboard::run(force)?;
        }
        Commands::Status => {
            commands::status::run()?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                commands::config_cmd::show()?;
            }
            ConfigCommands::Path => {
                commands::config_cmd::path()?;
            }
            ConfigCommands::Reset { force } => {
                commands::config_cmd::reset(force)?;
            }
        },
        Commands::Run {
            input,
            cycles,
            permission,
            json,
            save,
        } => {
            commands::run_cmd::run(&input, cycles, permission, json, save)?;
        }
        Commands::Metrics {
            input,
            cycles,
            permission,
            json,
        } => {
            commands::metrics::run(&input, cycles, permission, json)?;
        }
    }

    Ok(())
}
