//! Config loading and persistence.
//!
//! Layers, lowest first: built-in defaults, the user config file, a
//! `cattree.toml` in the working directory, then `CATTREE_*` env vars.

mod load;
mod merge;
mod schema;

pub use load::{
    config_path, load, load_for_dir, load_local_config, load_or_init, load_user_config,
    local_config_path, write_config,
};
pub use merge::{apply_env_overrides, apply_overrides_from, merge_layers};
pub use schema::{
    Config, ConfigLayer, FileLoggingConfig, FileLoggingConfigOverride, LogFormat, LogRotation,
    LoggingConfig, LoggingConfigOverride, StoreConfig, StoreConfigOverride, TreeConfig,
    TreeConfigOverride,
};
