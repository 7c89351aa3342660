//! Log scanner configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Which directories to scan and how to batch inserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Root whose immediate subdirectories are services.
    /// Only consulted when `services` is empty.
    #[serde(default)]
    pub log_root: Option<PathBuf>,
    /// Explicit `(name, path)` service directories.
    #[serde(default)]
    pub services: Vec<ServiceDirectory>,
    /// Lines parsed and inserted per transaction.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl ScannerConfig {
    /// Build a config for an explicit set of service directories.
    pub fn with_services(services: Vec<ServiceDirectory>) -> Self {
        Self {
            services,
            ..Self::default()
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            log_root: None,
            services: Vec::new(),
            batch_size: default_batch_size(),
        }
    }
}

/// One upstream service and the directory its log files land in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDirectory {
    /// Service name as stored on `log_files.service_name`.
    pub name: String,
    /// Directory scanned recursively for `*.log` files.
    pub path: PathBuf,
}

impl ServiceDirectory {
    /// Create a service directory entry.
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }
}

fn default_batch_size() -> usize {
    1000
}
