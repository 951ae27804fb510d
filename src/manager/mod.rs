//! Service manager
//!
//! Reconciles configured services at startup: stops or cleans up whatever
//! the marker file points at, launches a fresh process, and records it in
//! the registry and the marker file.

mod marker;
mod process;
mod registry;

pub use marker::{Marker, MarkerError, MARKER_FILE_NAME};
pub use process::{
    is_own_pid, process_exists, spawn_service, terminate_process, watch_exit, ProcessError,
    SpawnError,
};
pub use registry::{RegistryMap, ServiceRegistry, SharedRegistry};

use std::collections::BTreeMap;
use std::sync::Arc;

use nix::unistd::Pid;

use crate::config::{Config, ServiceDescriptor};

/// Outcome of a reconciliation pass
#[derive(Debug, Default)]
pub struct ReconcileSummary {
    /// Services launched, with their new PID
    pub started: BTreeMap<String, Pid>,
    /// Live prior instances that were terminated
    pub replaced: BTreeMap<String, Pid>,
    /// Services whose marker pointed at a dead PID
    pub stale: BTreeMap<String, Pid>,
    /// Services that failed to launch
    pub failed: BTreeMap<String, String>,
}

/// Starts services and owns the registry they are recorded in
pub struct Manager {
    registry: SharedRegistry,
}

impl Manager {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> SharedRegistry {
        Arc::clone(&self.registry)
    }

    /// Restart every configured service, one at a time
    ///
    /// A failing service is logged and skipped; the pass always completes.
    pub async fn reconcile(&self, config: &Config) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for service in config.services() {
            log::info!("Checking status of service {}", service.name);

            match self.stop_prior(service) {
                Prior::Replaced(pid) => {
                    summary.replaced.insert(service.name.clone(), pid);
                }
                Prior::Stale(pid) => {
                    summary.stale.insert(service.name.clone(), pid);
                }
                Prior::None => {}
            }

            match self.start(service).await {
                Ok(pid) => {
                    summary.started.insert(service.name.clone(), pid);
                }
                Err(e) => {
                    log::error!("Failed to start {}: {}", service.name, e);
                    summary.failed.insert(service.name.clone(), e.to_string());
                }
            }
        }

        summary
    }

    /// Launch a service and record its PID
    ///
    /// The registry is updated before the marker is written; a marker
    /// write failure is logged and the service still counts as started.
    pub async fn start(&self, service: &ServiceDescriptor) -> Result<Pid, ManagerError> {
        log::info!(
            "Starting service {} (command: {}, directory: {})",
            service.name,
            service.command,
            service.directory.display()
        );

        let (child, pid) = process::spawn_service(service)?;
        process::watch_exit(service.name.clone(), child);

        self.registry.insert(&service.name, pid).await;

        let marker = Marker::for_directory(&service.directory);
        match marker.write(pid) {
            Ok(()) => log::info!("{} started with PID {}", service.name, pid),
            Err(e) => log::warn!("{} started with PID {} but {}", service.name, pid, e),
        }

        Ok(pid)
    }

    /// Deal with whatever the marker file says is running
    fn stop_prior(&self, service: &ServiceDescriptor) -> Prior {
        let marker = Marker::for_directory(&service.directory);

        let pid = match marker.read() {
            Ok(Some(pid)) => pid,
            Ok(None) => return Prior::None,
            Err(e) => {
                log::warn!("{}: {}", service.name, e);
                return Prior::None;
            }
        };

        let prior = if process::is_own_pid(pid) {
            log::info!(
                "PID file for {} names procd itself (PID {}), treating as stale",
                service.name,
                pid
            );
            Prior::Stale(pid)
        } else if process::process_exists(pid) {
            log::info!(
                "{} is already running with PID {}, stopping",
                service.name,
                pid
            );
            if let Err(e) = process::terminate_process(pid) {
                log::error!("Failed to stop {} (PID {}): {}", service.name, pid, e);
            }
            Prior::Replaced(pid)
        } else {
            log::info!(
                "Stale PID file found for {}, removing {}",
                service.name,
                marker.path().display()
            );
            Prior::Stale(pid)
        };

        if let Err(e) = marker.remove() {
            log::warn!("{}: {}", service.name, e);
        }

        prior
    }
}

enum Prior {
    None,
    Replaced(Pid),
    Stale(Pid),
}

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Failed to spawn: {0}")]
    Spawn(#[from] SpawnError),
}
