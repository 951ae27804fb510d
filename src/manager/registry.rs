//! In-memory service registry
//!
//! Maps service name to the PID most recently launched for it. A single
//! mutex guards the map; callers doing check-then-act hold the guard from
//! [`ServiceRegistry::lock`] across both steps. The registry never probes
//! liveness itself.

use std::collections::HashMap;
use std::sync::Arc;

use nix::unistd::Pid;
use tokio::sync::{Mutex, MutexGuard};

pub type RegistryMap = HashMap<String, Pid>;

#[derive(Debug, Default)]
pub struct ServiceRegistry {
    pids: Mutex<RegistryMap>,
}

pub type SharedRegistry = Arc<ServiceRegistry>;

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(Self::new())
    }

    /// Record a freshly launched process, replacing any previous entry
    pub async fn insert(&self, name: &str, pid: Pid) -> Option<Pid> {
        self.pids.lock().await.insert(name.to_string(), pid)
    }

    pub async fn get(&self, name: &str) -> Option<Pid> {
        self.pids.lock().await.get(name).copied()
    }

    /// Hold the lock for a check-then-act sequence
    pub async fn lock(&self) -> MutexGuard<'_, RegistryMap> {
        self.pids.lock().await
    }

    pub async fn len(&self) -> usize {
        self.pids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pids.lock().await.is_empty()
    }
}
