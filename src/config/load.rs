use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::{Error, Result};

use super::merge::{apply_env_overrides, merge_layers};
use super::{Config, ConfigLayer};

pub fn config_path() -> PathBuf {
    crate::paths::config_dir().join("config.toml")
}

/// Per-directory override file, looked up in the working directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join("cattree.toml")
}

pub fn load_user_config() -> Result<Option<ConfigLayer>> {
    read_layer(&config_path())
}

pub fn load_local_config(dir: &Path) -> Result<Option<ConfigLayer>> {
    read_layer(&local_config_path(dir))
}

fn read_layer(path: &Path) -> Result<Option<ConfigLayer>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| config_error(format!("failed to read {}: {e}", path.display())))?;
    toml::from_str(&contents)
        .map(Some)
        .map_err(|e| config_error(format!("failed to parse {}: {e}", path.display())))
}

pub fn load() -> Result<Config> {
    let cwd = std::env::current_dir().ok();
    load_for_dir(cwd.as_deref())
}

pub fn load_for_dir(dir: Option<&Path>) -> Result<Config> {
    let user = load_user_config()?;
    let local = match dir {
        Some(dir) => load_local_config(dir)?,
        None => None,
    };
    let mut config = merge_layers(user, local);
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Load the layered config, falling back to defaults on any error.
///
/// Writes a default user config the first time so there is a file to edit.
pub fn load_or_init() -> Config {
    let path = config_path();
    let had_user_config = path.exists();

    let config = match load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("config load failed, using defaults: {e}");
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            cfg
        }
    };

    if !had_user_config {
        let default_cfg = Config::default();
        if let Err(e) = write_config(&path, &default_cfg) {
            tracing::warn!("failed to write default config: {e}");
        }
    }

    config
}

pub fn write_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|e| config_error(format!("failed to create {}: {e}", dir.display())))?;
    }
    let contents = toml::to_string_pretty(cfg)
        .map_err(|e| config_error(format!("failed to render config: {e}")))?;
    atomic_write(path, contents.as_bytes())
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| config_error("config path missing parent directory".to_string()))?;
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        config_error(format!(
            "failed to create temp file in {}: {e}",
            dir.display()
        ))
    })?;
    fs::write(temp.path(), data)
        .map_err(|e| config_error(format!("failed to write config temp file: {e}")))?;
    temp.persist(path).map_err(|e| {
        config_error(format!(
            "failed to persist config to {}: {e}",
            path.display()
        ))
    })?;
    Ok(())
}

fn config_error(reason: String) -> Error {
    Error::Config(ConfigError { reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::{FileLoggingConfig, LogFormat, LogRotation, LoggingConfig, StoreConfig, TreeConfig};

    #[test]
    fn config_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            store: StoreConfig {
                path: Some(PathBuf::from("/srv/catalog/categories.json")),
            },
            tree: TreeConfig {
                protected_name: "Divers".to_string(),
                protected_id: 12,
            },
            logging: LoggingConfig {
                stdout: false,
                stdout_format: LogFormat::Compact,
                filter: Some("catalog_tree=debug".to_string()),
                file: FileLoggingConfig {
                    enabled: true,
                    dir: Some(PathBuf::from("/tmp/cattree-test-logs")),
                    format: LogFormat::Json,
                    rotation: LogRotation::Hourly,
                    retention_max_age_days: Some(3),
                    retention_max_files: Some(7),
                },
            },
        };
        write_config(&path, &cfg).expect("write config");
        let loaded = {
            let contents = fs::read_to_string(&path).expect("read config");
            toml::from_str::<Config>(&contents).expect("parse config")
        };
        assert_eq!(
            loaded.store.path.as_deref(),
            Some(Path::new("/srv/catalog/categories.json"))
        );
        assert_eq!(loaded.tree.protected_name, "Divers");
        assert_eq!(loaded.tree.protected_id, 12);
        assert!(!loaded.logging.stdout);
        assert_eq!(loaded.logging.stdout_format, LogFormat::Compact);
        assert_eq!(loaded.logging.filter.as_deref(), Some("catalog_tree=debug"));
        assert!(loaded.logging.file.enabled);
        assert_eq!(loaded.logging.file.rotation, LogRotation::Hourly);
        assert_eq!(loaded.logging.file.retention_max_age_days, Some(3));
        assert_eq!(loaded.logging.file.retention_max_files, Some(7));
    }

    #[test]
    fn missing_local_config_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_local_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn invalid_local_config_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(local_config_path(dir.path()), "tree = [").unwrap();
        let err = load_local_config(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("failed to parse"));
    }
}
