//! XDG directory helpers for config/data/log locations.

use std::cell::RefCell;
use std::path::PathBuf;

const APP_DIR: &str = "cattree";

/// Base directory for persistent data (the category snapshot).
///
/// Uses `CATTREE_DATA_DIR` if set, otherwise `$XDG_DATA_HOME/cattree` or
/// `~/.local/share/cattree`.
pub(crate) fn data_dir() -> PathBuf {
    if let Some(dir) = thread_local_data_dir_override() {
        return dir;
    }

    if let Some(dir) = env_dir("CATTREE_DATA_DIR") {
        return dir;
    }

    xdg_base("XDG_DATA_HOME", &[".local", "share"]).join(APP_DIR)
}

/// Base directory for configuration files.
///
/// Uses `CATTREE_CONFIG_DIR` if set, otherwise `$XDG_CONFIG_HOME/cattree` or
/// `~/.config/cattree`.
pub(crate) fn config_dir() -> PathBuf {
    if let Some(dir) = env_dir("CATTREE_CONFIG_DIR") {
        return dir;
    }

    xdg_base("XDG_CONFIG_HOME", &[".config"]).join(APP_DIR)
}

/// Default rolling log directory.
pub(crate) fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Default JSON snapshot used by the CLI.
pub(crate) fn default_store_path() -> PathBuf {
    data_dir().join("categories.json")
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
}

fn xdg_base(var: &str, fallback: &[&str]) -> PathBuf {
    env_dir(var).unwrap_or_else(|| {
        fallback.iter().fold(
            dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp")),
            |dir, part| dir.join(part),
        )
    })
}

#[cfg(test)]
pub(crate) struct DataDirOverride {
    prev: Option<PathBuf>,
}

#[cfg(test)]
impl DataDirOverride {
    fn new(path: Option<PathBuf>) -> Self {
        let prev = DATA_DIR_OVERRIDE.with(|cell| cell.replace(path));
        Self { prev }
    }
}

#[cfg(test)]
impl Drop for DataDirOverride {
    fn drop(&mut self) {
        let prev = self.prev.take();
        DATA_DIR_OVERRIDE.with(|cell| {
            cell.replace(prev);
        });
    }
}

/// Point `data_dir()` at `path` on this thread until the guard drops.
#[cfg(test)]
pub(crate) fn override_data_dir_for_tests(path: Option<PathBuf>) -> DataDirOverride {
    DataDirOverride::new(path)
}

fn thread_local_data_dir_override() -> Option<PathBuf> {
    DATA_DIR_OVERRIDE.with(|cell| cell.borrow().clone())
}

thread_local! {
    static DATA_DIR_OVERRIDE: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
}
