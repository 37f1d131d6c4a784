//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Page size used when a listing request does not specify one.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: usize,
    /// Largest page size a listing request may ask for.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: usize,
    /// Expose the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_page_limit() -> usize {
    crate::DEFAULT_PAGE_LIMIT
}

fn default_max_page_limit() -> usize {
    crate::MAX_PAGE_LIMIT
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl ServerConfig {
    /// Validate page limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_page_limit == 0 {
            return Err("server.max_page_limit must be at least 1".to_string());
        }
        if self.default_page_limit == 0 || self.default_page_limit > self.max_page_limit {
            return Err(format!(
                "server.default_page_limit must be between 1 and {}",
                self.max_page_limit
            ));
        }
        Ok(())
    }
}

/// Table backend configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local tables, lost on restart.
    #[default]
    Memory,
    /// One file per collection under a root directory.
    Filesystem {
        /// Root directory holding the collection files.
        path: PathBuf,
    },
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::Filesystem { path } if path.as_os_str().is_empty() => {
                Err("filesystem storage requires a non-empty path".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Index reconciliation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Rebuild the index from the backend before serving requests (default: true).
    #[serde(default = "default_flush_on_startup")]
    pub flush_on_startup: bool,
    /// Rebuild the index periodically, every this many seconds.
    /// Disabled when unset.
    #[serde(default)]
    pub interval_secs: Option<u64>,
}

fn default_flush_on_startup() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            flush_on_startup: default_flush_on_startup(),
            interval_secs: None,
        }
    }
}

impl SyncConfig {
    /// Periodic flush interval, if enabled.
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }

    /// Validate sync configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_secs == Some(0) {
            return Err("sync.interval_secs cannot be 0; omit it to disable periodic flush"
                .to_string());
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Table backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Reconciliation configuration.
    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Create a test configuration: in-memory backend, no startup flush.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::Memory,
            sync: SyncConfig {
                flush_on_startup: false,
                interval_secs: None,
            },
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.storage.validate()?;
        self.sync.validate()
    }
}
