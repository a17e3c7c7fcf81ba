// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `crm serve`: wire storage, bus and services from configuration and run
//! the gRPC and health listeners until SIGINT/SIGTERM.

use anyhow::{Context, Result};
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crm_core::application::repository_factory::{create_message_bus, create_repositories};
use crm_core::application::{CrmServices, EventNotifier};
use crm_core::domain::repository::StorageBackend;
use crm_core::domain::service_config::{BusBackend, ServiceConfigManifest};
use crm_core::infrastructure::db::Database;
use crm_core::presentation::api;
use crm_core::presentation::grpc::start_grpc_server;

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Bind address for all listeners (overrides spec.server.bind_address)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// gRPC port (overrides spec.server.grpc_port)
    #[arg(long)]
    pub grpc_port: Option<u16>,

    /// Health endpoint port (overrides spec.server.http_port)
    #[arg(long)]
    pub http_port: Option<u16>,
}

/// Load, override and validate the service configuration.
pub fn load_config(path: Option<PathBuf>, args: &ServeArgs) -> Result<ServiceConfigManifest> {
    let mut config =
        ServiceConfigManifest::load_or_default(path).context("Failed to load configuration")?;
    apply_args(&mut config, args);
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

fn apply_args(config: &mut ServiceConfigManifest, args: &ServeArgs) {
    if let Some(bind) = &args.bind {
        config.spec.server.bind_address = bind.clone();
    }
    if let Some(port) = args.grpc_port {
        config.spec.server.grpc_port = port;
    }
    if let Some(port) = args.http_port {
        config.spec.server.http_port = port;
    }
}

pub async fn run(config: ServiceConfigManifest) -> Result<()> {
    let server = &config.spec.server;
    let ip: IpAddr = server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", server.bind_address))?;
    let grpc_addr = SocketAddr::new(ip, server.grpc_port);
    let http_addr = SocketAddr::new(ip, server.http_port);
    let request_timeout = Duration::from_secs(server.request_timeout_seconds);

    info!(
        name = %config.metadata.name,
        instance_version = config.metadata.version.as_deref().unwrap_or("unversioned"),
        labels = %config.metadata.label_summary(),
        version = env!("CARGO_PKG_VERSION"),
        "Starting CRM service"
    );

    if let Some(metrics) = config.metrics().filter(|m| m.enabled) {
        let metrics_addr = SocketAddr::new(ip, metrics.port);
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        describe_metrics();
        info!("Prometheus metrics exposed on {}", metrics_addr);
    }

    let backend = config.storage_backend();
    let database = match &backend {
        StorageBackend::PostgreSQL(pg) => {
            let database = Database::new(&pg.connection_string, pg.max_connections).await?;
            if config.spec.database.run_migrations {
                database.migrate().await?;
            }
            info!("Connected to PostgreSQL");
            Some(database)
        }
        StorageBackend::InMemory => {
            warn!("Using in-memory storage; records are lost on restart");
            None
        }
    };

    let repositories = create_repositories(&backend, database.as_ref())?;
    let bus = create_message_bus(&config.spec.bus)?;
    let services = CrmServices::new(repositories, EventNotifier::new(bus));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind health endpoint on {}", http_addr))?;
    info!("Health endpoint listening on {}", http_addr);

    let health = api::app(storage_label(&backend), bus_label(config.spec.bus.backend));
    let http_token = shutdown.clone();
    let http = tokio::spawn(async move {
        axum::serve(listener, health)
            .with_graceful_shutdown(async move { http_token.cancelled().await })
            .await
    });

    let grpc = start_grpc_server(grpc_addr, services, shutdown.clone(), request_timeout).await;

    // Also stops the health listener when gRPC exits on its own
    shutdown.cancel();
    match http.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Health endpoint failed: {}", e),
        Err(e) => error!("Health endpoint task panicked: {}", e),
    }

    grpc.context("gRPC server failed")?;
    info!("CRM service shut down");
    Ok(())
}

fn storage_label(backend: &StorageBackend) -> &'static str {
    match backend {
        StorageBackend::InMemory => "memory",
        StorageBackend::PostgreSQL(_) => "postgres",
    }
}

fn bus_label(backend: BusBackend) -> &'static str {
    match backend {
        BusBackend::Broadcast => "broadcast",
        BusBackend::KafkaRest => "kafka-rest",
    }
}

fn describe_metrics() {
    metrics::describe_counter!(
        "crm_events_published_total",
        "Entity events accepted by the message bus"
    );
    metrics::describe_counter!(
        "crm_event_publish_failures_total",
        "Entity events that could not be encoded or published"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::domain::service_config::DatabaseBackend;

    #[test]
    fn test_args_override_config() {
        let mut config = ServiceConfigManifest::default();
        let args = ServeArgs {
            bind: Some("127.0.0.1".to_string()),
            grpc_port: Some(6000),
            http_port: None,
        };
        apply_args(&mut config, &args);

        assert_eq!(config.spec.server.bind_address, "127.0.0.1");
        assert_eq!(config.spec.server.grpc_port, 6000);
        assert_eq!(config.spec.server.http_port, 8080);
    }

    #[test]
    fn test_labels() {
        assert_eq!(storage_label(&StorageBackend::InMemory), "memory");
        assert_eq!(bus_label(BusBackend::KafkaRest), "kafka-rest");

        let mut config = ServiceConfigManifest::default();
        config.spec.database.backend = DatabaseBackend::Postgres;
        config.spec.database.url = Some("postgres://localhost/crm".to_string());
        assert_eq!(storage_label(&config.storage_backend()), "postgres");
    }

    #[test]
    fn test_load_config_rejects_port_clash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crm-config.yaml");
        std::fs::write(
            &path,
            "apiVersion: crm/v1\nkind: ServiceConfig\nmetadata:\n  name: test\n",
        )
        .unwrap();

        let args = ServeArgs {
            grpc_port: Some(7000),
            http_port: Some(7000),
            ..Default::default()
        };
        assert!(load_config(Some(path.clone()), &args).is_err());
        assert!(load_config(Some(path), &ServeArgs::default()).is_ok());
    }
}
