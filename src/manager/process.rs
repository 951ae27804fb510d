//! Process spawning, liveness probing and termination

use std::process::Stdio;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};

use crate::config::ServiceDescriptor;

/// Spawn a process for a service
///
/// Runs `sh -c <command>` inside the service directory with the default
/// environment. Output is discarded.
pub fn spawn_service(service: &ServiceDescriptor) -> Result<(Child, Pid), SpawnError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&service.command);
    cmd.current_dir(&service.directory);

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let child = cmd
        .spawn()
        .map_err(|e| SpawnError::Spawn(service.name.clone(), e))?;

    let pid = child
        .id()
        .and_then(|id| i32::try_from(id).ok())
        .map(Pid::from_raw)
        .ok_or_else(|| SpawnError::NoPid(service.name.clone()))?;

    Ok((child, pid))
}

/// Wait on a launched child in the background so it does not linger as a zombie
///
/// Only logs the exit; the registry learns about it lazily.
pub fn watch_exit(name: String, mut child: Child) {
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => log::info!("{} exited ({})", name, status),
            Err(e) => log::warn!("Failed to wait on {}: {}", name, e),
        }
    });
}

/// Check whether `pid` refers to a live process we may signal
///
/// Probes with the null signal. Any failure, including EPERM, counts as
/// "not alive".
pub fn process_exists(pid: Pid) -> bool {
    if pid.as_raw() <= 0 {
        return false;
    }
    kill(pid, None).is_ok()
}

/// Whether `pid` is this supervisor's own process
pub fn is_own_pid(pid: Pid) -> bool {
    pid == Pid::this()
}

/// Send SIGKILL to `pid`
///
/// Does not wait for the process to exit. Refuses to signal ourselves.
pub fn terminate_process(pid: Pid) -> Result<(), ProcessError> {
    if pid.as_raw() <= 0 {
        return Err(ProcessError::InvalidPid(pid.as_raw()));
    }
    if is_own_pid(pid) {
        return Err(ProcessError::OwnPid(pid.as_raw()));
    }
    kill(pid, Signal::SIGKILL).map_err(|e| ProcessError::Signal(pid.as_raw(), e))
}

#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("Failed to spawn {0}: {1}")]
    Spawn(String, #[source] std::io::Error),

    #[error("Spawned {0} but no PID was reported")]
    NoPid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Invalid PID {0}")]
    InvalidPid(i32),

    #[error("Refusing to signal own PID {0}")]
    OwnPid(i32),

    #[error("Failed to signal PID {0}: {1}")]
    Signal(i32, #[source] nix::Error),
}
