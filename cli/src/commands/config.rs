// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crm_core::domain::service_config::ServiceConfigManifest;

const SAMPLE_CONFIG: &str = include_str!("../../templates/crm-config.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./crm-config.yaml)
        #[arg(short, long, default_value = "./crm-config.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, force } => generate(&output, force).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = ServiceConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. CRM_CONFIG_PATH: {}",
            std::env::var("CRM_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./crm-config.yaml");
        println!("  4. ~/.crm/config.yaml");
        println!("  5. /etc/crm/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Instance:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    if config.metadata.labels.as_ref().is_some_and(|l| !l.is_empty()) {
        println!("  Labels: {}", config.metadata.label_summary());
    }
    println!();

    let server = &config.spec.server;
    println!("{}", "Server:".bold());
    println!("  Bind address: {}", server.bind_address);
    println!("  gRPC port: {}", server.grpc_port);
    println!("  Health port: {}", server.http_port);
    println!("  Request timeout: {}s", server.request_timeout_seconds);
    println!();

    let database = &config.spec.database;
    println!("{}", "Storage:".bold());
    println!("  Backend: {:?}", database.backend);
    if let Some(url) = &database.url {
        println!("  URL: {}", redact_url(url));
    }
    println!("  Max connections: {}", database.max_connections);
    println!("  Run migrations: {}", database.run_migrations);
    println!();

    let bus = &config.spec.bus;
    println!("{}", "Message bus:".bold());
    println!("  Backend: {:?}", bus.backend);
    if let Some(endpoint) = &bus.endpoint {
        println!("  Endpoint: {}", endpoint);
    }
    println!("  Publish timeout: {}s", bus.publish_timeout_seconds);
    println!();

    Ok(())
}

/// Hide the password part of a connection URL.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{}://{}:****@{}", scheme, user, host),
        None => url.to_string(),
    }
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = ServiceConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            output.display()
        );
    }

    std::fs::write(output, SAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
