use clap::{Parser, Subcommand};
use miette::{miette, Result};
use std::path::PathBuf;

use qir_rt::cli;
use qir_rt::cli::replay::ReportFormat;

#[derive(Parser)]
#[command(name = "qir-rt")]
#[command(about = "Replay QIR runtime intrinsic traces with external result reference counting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON trace of intrinsic calls on the classical backend
    Replay {
        /// Input script file
        script: PathBuf,

        /// Runtime configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Validate a runtime configuration file
    CheckConfig {
        /// Configuration file (JSON)
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            script,
            config,
            output,
            format,
        } => {
            let args = cli::replay::ReplayArgs {
                script_path: script,
                config_path: config,
                output_path: output,
                format,
            };
            cli::replay::replay(&args).map_err(|e| miette!("{}", e))
        }
        Commands::CheckConfig { config } => {
            cli::check_config::check_config(&config).map_err(|e| miette!("{}", e))
        }
    }
}
