//! procd - Minimal local process supervisor
//!
//! A Rust implementation that:
//! - Loads a YAML list of named services (shell command + working directory)
//! - Keeps at most one instance of each running, tracked by a `service.pid` marker
//! - Restarts every service once at startup
//! - Exposes an HTTP `/kill` endpoint to terminate by pid or service name
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                      procd                       │
//! ├─────────────────────────────────────────────────┤
//! │    Config    │   Reconciler    │ Control plane  │
//! ├─────────────────────────────────────────────────┤
//! │   Service registry  │  Marker files │ Processes │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod control;
pub mod manager;
pub mod protocol;

pub use config::{Config, ConfigError, ServiceDescriptor};
pub use manager::{ReconcileSummary, ServiceRegistry};
