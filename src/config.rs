//! Service configuration
//!
//! ```yaml
//! services:
//!   api:
//!     command: ./run.sh --port 3000
//!     directory: /srv/api
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "workspaces.yaml";

/// Launch descriptor for a single service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceDescriptor {
    /// Filled in from the map key after parsing
    #[serde(skip)]
    pub name: String,
    /// Shell command line, run with `sh -c`
    pub command: String,
    /// Working directory; also holds the `service.pid` marker
    pub directory: PathBuf,
}

/// Parsed configuration document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub services: BTreeMap<String, ServiceDescriptor>,
}

impl Config {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse a config document from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;

        for (name, service) in config.services.iter_mut() {
            service.name = name.clone();
            service.validate()?;
        }

        Ok(config)
    }

    /// Iterate services in name order
    pub fn services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values()
    }
}

impl ServiceDescriptor {
    pub fn new(name: &str, command: &str, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            directory: directory.into(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid(self.name.clone(), "empty service name".into()));
        }
        if self.command.trim().is_empty() {
            return Err(ConfigError::Invalid(self.name.clone(), "command is empty".into()));
        }
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(self.name.clone(), "directory is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid service {0}: {1}")]
    Invalid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_services() {
        let config = Config::parse(
            r#"
services:
  web:
    command: python -m http.server 8000
    directory: /srv/web
  worker:
    command: ./worker
    directory: /srv/worker
"#,
        )
        .unwrap();

        assert_eq!(config.services.len(), 2);
        let web = &config.services["web"];
        assert_eq!(web.name, "web");
        assert_eq!(web.command, "python -m http.server 8000");
        assert_eq!(web.directory, PathBuf::from("/srv/web"));

        let names: Vec<_> = config.services().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["web", "worker"]);
    }

    #[test]
    fn test_parse_empty_document() {
        let config = Config::parse("services: {}").unwrap();
        assert!(config.services.is_empty());
    }

    #[test]
    fn test_parse_missing_field() {
        let result = Config::parse(
            r#"
services:
  web:
    command: ./run
"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let result = Config::parse("services: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_blank_command_rejected() {
        let result = Config::parse(
            r#"
services:
  web:
    command: "   "
    directory: /srv/web
"#,
        );
        match result {
            Err(ConfigError::Invalid(name, _)) => assert_eq!(name, "web"),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/procd-test.yaml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspaces.yaml");
        std::fs::write(&path, "services: [").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("workspaces.yaml"));
    }
}
