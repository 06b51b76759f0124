use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::CategoryId;
use crate::tree::ProtectedPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub tree: TreeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON snapshot path. Defaults to `<data dir>/categories.json`.
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(crate::paths::default_store_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Name of the reserved fallback category (case-insensitive).
    pub protected_name: String,
    /// Id of the reserved fallback category; `0` disables the id rule.
    pub protected_id: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        let policy = ProtectedPolicy::default();
        Self {
            protected_name: policy.name,
            protected_id: policy.id.map_or(0, CategoryId::get),
        }
    }
}

impl TreeConfig {
    pub fn policy(&self) -> ProtectedPolicy {
        ProtectedPolicy {
            name: self.protected_name.trim().to_string(),
            id: (self.protected_id != 0).then(|| CategoryId::new(self.protected_id)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Tree,
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRotation {
    Daily,
    Hourly,
    Minutely,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub stdout: bool,
    pub stdout_format: LogFormat,
    pub filter: Option<String>,
    pub file: FileLoggingConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stdout: true,
            stdout_format: LogFormat::Tree,
            filter: None,
            file: FileLoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub rotation: LogRotation,
    pub retention_max_age_days: Option<u64>,
    pub retention_max_files: Option<usize>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: None,
            format: LogFormat::Json,
            rotation: LogRotation::Daily,
            retention_max_age_days: Some(7),
            retention_max_files: Some(10),
        }
    }
}

/// Partial config read from one file. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfigLayer {
    pub store: StoreConfigOverride,
    pub tree: TreeConfigOverride,
    pub logging: LoggingConfigOverride,
}

impl ConfigLayer {
    pub fn apply_to(&self, target: &mut Config) {
        self.store.apply_to(&mut target.store);
        self.tree.apply_to(&mut target.tree);
        self.logging.apply_to(&mut target.logging);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfigOverride {
    pub path: Option<PathBuf>,
}

impl StoreConfigOverride {
    pub fn apply_to(&self, target: &mut StoreConfig) {
        if let Some(path) = self.path.as_ref() {
            target.path = Some(path.clone());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfigOverride {
    pub protected_name: Option<String>,
    pub protected_id: Option<u64>,
}

impl TreeConfigOverride {
    pub fn apply_to(&self, target: &mut TreeConfig) {
        if let Some(name) = self.protected_name.as_ref() {
            target.protected_name = name.clone();
        }
        if let Some(id) = self.protected_id {
            target.protected_id = id;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfigOverride {
    pub stdout: Option<bool>,
    pub stdout_format: Option<LogFormat>,
    pub filter: Option<String>,
    pub file: Option<FileLoggingConfigOverride>,
}

impl LoggingConfigOverride {
    pub fn apply_to(&self, target: &mut LoggingConfig) {
        if let Some(stdout) = self.stdout {
            target.stdout = stdout;
        }
        if let Some(format) = self.stdout_format {
            target.stdout_format = format;
        }
        if let Some(filter) = self.filter.as_ref() {
            target.filter = Some(filter.clone());
        }
        if let Some(file) = self.file.as_ref() {
            file.apply_to(&mut target.file);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileLoggingConfigOverride {
    pub enabled: Option<bool>,
    pub dir: Option<PathBuf>,
    pub format: Option<LogFormat>,
    pub rotation: Option<LogRotation>,
    pub retention_max_age_days: Option<u64>,
    pub retention_max_files: Option<usize>,
}

impl FileLoggingConfigOverride {
    pub fn apply_to(&self, target: &mut FileLoggingConfig) {
        if let Some(enabled) = self.enabled {
            target.enabled = enabled;
        }
        if let Some(dir) = self.dir.as_ref() {
            target.dir = Some(dir.clone());
        }
        if let Some(format) = self.format {
            target.format = format;
        }
        if let Some(rotation) = self.rotation {
            target.rotation = rotation;
        }
        if let Some(days) = self.retention_max_age_days {
            target.retention_max_age_days = Some(days);
        }
        if let Some(files) = self.retention_max_files {
            target.retention_max_files = Some(files);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tree_config_matches_default_policy() {
        assert_eq!(TreeConfig::default().policy(), ProtectedPolicy::default());
    }

    #[test]
    fn zero_protected_id_disables_id_rule() {
        let tree = TreeConfig {
            protected_name: " Divers ".into(),
            protected_id: 0,
        };
        let policy = tree.policy();
        assert_eq!(policy.id, None);
        assert_eq!(policy.name, "Divers");
    }

    #[test]
    fn partial_layer_parses_from_toml() {
        let layer: ConfigLayer = toml::from_str(
            r#"
            [tree]
            protected_name = "Divers"

            [logging.file]
            enabled = true
            "#,
        )
        .unwrap();
        let mut config = Config::default();
        layer.apply_to(&mut config);
        assert_eq!(config.tree.protected_name, "Divers");
        assert_eq!(config.tree.protected_id, 1);
        assert!(config.logging.file.enabled);
        assert_eq!(config.logging.file.format, LogFormat::Json);
    }
}
