use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::FolderId;

/// Top-level configuration for Jotter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JotterConfig {
    pub storage: StorageConfig,
    pub notebook: NotebookConfig,
    pub queries: QueryWindows,
    pub logging: LoggingConfig,
}

/// Durable-storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key the single application record is stored under
    pub key: String,
    /// Directory the file backend keeps its records in
    pub dir: PathBuf,
}

/// Notebook-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookConfig {
    /// Fixed folder set used as filter keys; folders are configuration,
    /// not stored entities
    pub folders: Vec<FolderConfig>,
}

/// Individual folder entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    pub id: FolderId,
    /// Friendly name shown by the view layer
    pub name: String,
}

/// Windows governing the remote-query cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryWindows {
    /// How long a cached result is served without a refetch
    #[serde(default = "default_stale_time_ms")]
    pub stale_time_ms: u64,
    /// How long an unused entry is retained before eviction
    #[serde(default = "default_gc_time_ms")]
    pub gc_time_ms: u64,
    /// How many times a failed fetch is retried before surfacing
    #[serde(default = "default_retry")]
    pub retry: u32,
}

/// Logging and telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether to show a state summary on startup
    #[serde(default = "default_true")]
    pub show_startup_summary: bool,
}

fn default_stale_time_ms() -> u64 {
    1000 * 60 * 5
}

fn default_gc_time_ms() -> u64 {
    1000 * 60 * 10
}

fn default_retry() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for JotterConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                key: crate::persist::STORAGE_KEY.to_string(),
                dir: PathBuf::from(".jotter"),
            },
            notebook: NotebookConfig {
                folders: vec![
                    FolderConfig {
                        id: crate::model::FOLDER_ALL.to_string(),
                        name: "All Notes".to_string(),
                    },
                    FolderConfig {
                        id: "work".to_string(),
                        name: "Work".to_string(),
                    },
                    FolderConfig {
                        id: "personal".to_string(),
                        name: "Personal".to_string(),
                    },
                ],
            },
            queries: QueryWindows {
                stale_time_ms: default_stale_time_ms(),
                gc_time_ms: default_gc_time_ms(),
                retry: default_retry(),
            },
            logging: LoggingConfig {
                show_startup_summary: true,
            },
        }
    }
}

impl JotterConfig {
    /// Load config from YAML
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
