//! procd - Minimal local process supervisor
//!
//! Reads services from a YAML file, restarts each one (stopping whatever
//! its `service.pid` marker points at), then serves `POST /kill` until
//! interrupted. Services keep running after procd exits.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use procd::config::{Config, DEFAULT_CONFIG_PATH};
use procd::control;
use procd::manager::{Manager, ServiceRegistry};
use procd::protocol::DEFAULT_LISTEN_ADDR;

#[derive(Parser)]
#[command(name = "procd")]
#[command(about = "Minimal local process supervisor")]
struct Args {
    /// Path to the services file
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Address for the control plane
    #[arg(long, short = 'l', default_value = DEFAULT_LISTEN_ADDR)]
    listen: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Validate the services file and list its services without starting them
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load(&args.config).map_err(|e| {
        log::error!("{}", e);
        e
    })?;

    if let Some(Command::Check) = args.command {
        check(&config);
        return Ok(());
    }

    let manager = Manager::new(ServiceRegistry::shared());
    let summary = manager.reconcile(&config).await;
    info!(
        "Reconciled {} services: {} started, {} replaced, {} stale, {} failed",
        config.services.len(),
        summary.started.len(),
        summary.replaced.len(),
        summary.stale.len(),
        summary.failed.len()
    );
    for (name, reason) in &summary.failed {
        log::warn!("  {}: {}", name, reason);
    }

    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .map_err(|e| {
            log::error!("Failed to bind {}: {}", args.listen, e);
            e
        })?;

    control::serve(listener, manager.registry()).await?;

    Ok(())
}

fn check(config: &Config) {
    if config.services.is_empty() {
        println!("No services configured");
        return;
    }
    println!("{:<24} {:<32} COMMAND", "SERVICE", "DIRECTORY");
    for service in config.services() {
        println!(
            "{:<24} {:<32} {}",
            service.name,
            service.directory.display(),
            service.command
        );
    }
}
