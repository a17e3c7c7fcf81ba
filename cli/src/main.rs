// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # CRM Service CLI
//!
//! The `crm` binary hosts the CRM gRPC services.
//!
//! ## Commands
//!
//! - `crm serve` - Run the gRPC API, the `/health` endpoint and the metrics exporter
//! - `crm config show|validate|generate` - Configuration management
//!
//! Configuration is discovered from `--config`, `CRM_CONFIG_PATH`,
//! `./crm-config.yaml`, `~/.crm/config.yaml` and `/etc/crm/config.yaml`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crm_cli::commands::{self, ConfigCommand, ServeArgs};
use crm_cli::logging::{bootstrap_subscriber, init_logging, LogFormat};

/// CRM backend - entity lifecycle services over gRPC
#[derive(Parser)]
#[command(name = "crm")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "CRM_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true, env = "CRM_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the CRM service
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            // The configured subscriber is only known once the file is read
            let bootstrap = bootstrap_subscriber(cli.log_level.as_deref().unwrap_or("info"))?;
            let config = tracing::subscriber::with_default(bootstrap, || {
                commands::serve::load_config(cli.config, &args)
            })?;

            let (level, format) = match config.logging() {
                Some(logging) => (logging.level.clone(), LogFormat::parse(&logging.format)),
                None => ("info".to_string(), LogFormat::Text),
            };
            init_logging(cli.log_level.as_deref().unwrap_or(&level), format)?;
            commands::serve::run(config).await
        }
        Commands::Config { command } => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"), LogFormat::Text)?;
            commands::config::handle_command(command, cli.config).await
        }
    }
}
