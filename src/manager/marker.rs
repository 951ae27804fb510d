//! `service.pid` marker files
//!
//! One per service, in the service directory, holding the decimal PID of
//! the last process started for it. The content may be stale and is always
//! checked against the live process table before use.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use nix::unistd::Pid;

pub const MARKER_FILE_NAME: &str = "service.pid";

#[derive(Debug, Clone)]
pub struct Marker {
    path: PathBuf,
}

impl Marker {
    /// Marker for a service working directory
    pub fn for_directory(directory: &Path) -> Self {
        Self {
            path: directory.join(MARKER_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded PID
    ///
    /// A missing file or content that is not an integer yields `Ok(None)`.
    pub fn read(&self) -> Result<Option<Pid>, MarkerError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(MarkerError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match content.trim().parse::<i32>() {
            Ok(pid) => Ok(Some(Pid::from_raw(pid))),
            Err(_) => {
                log::debug!("Ignoring unparseable marker {}", self.path.display());
                Ok(None)
            }
        }
    }

    /// Record `pid`, replacing any previous content
    pub fn write(&self, pid: Pid) -> Result<(), MarkerError> {
        std::fs::write(&self.path, pid.as_raw().to_string()).map_err(|source| {
            MarkerError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Delete the marker; a marker that is already gone is not an error
    pub fn remove(&self) -> Result<(), MarkerError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(MarkerError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("Failed to read marker {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write marker {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove marker {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}
