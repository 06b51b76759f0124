use std::path::PathBuf;

use super::{Config, ConfigLayer};

pub fn merge_layers(user: Option<ConfigLayer>, local: Option<ConfigLayer>) -> Config {
    let mut config = Config::default();
    if let Some(layer) = user {
        layer.apply_to(&mut config);
    }
    if let Some(layer) = local {
        layer.apply_to(&mut config);
    }
    config
}

pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply `CATTREE_*` overrides read through `lookup`.
pub fn apply_overrides_from(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(raw) = lookup("CATTREE_STORE") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.store.path = Some(PathBuf::from(trimmed));
        }
    }

    if let Some(raw) = lookup("CATTREE_PROTECTED_NAME") {
        config.tree.protected_name = raw.trim().to_string();
    }

    if let Some(raw) = lookup("CATTREE_PROTECTED_ID") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<u64>() {
                Ok(value) => {
                    config.tree.protected_id = value;
                }
                Err(err) => {
                    tracing::warn!("invalid CATTREE_PROTECTED_ID, ignoring: {err}");
                }
            }
        }
    }
}
