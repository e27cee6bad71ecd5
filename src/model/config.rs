use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::store::TaskDefaults;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Data file location (default: `$XDG_DATA_HOME/taskdesk/tasks.json`)
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Labels applied to new tasks when `add` is given none
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// An `EnvFilter` directive, e.g. `warn` or `taskdesk=debug`.
    /// `TASKDESK_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl AppConfig {
    pub fn task_defaults(&self) -> TaskDefaults {
        TaskDefaults {
            priority: self.defaults.priority.clone(),
            category: self.defaults.category.clone(),
        }
    }
}
