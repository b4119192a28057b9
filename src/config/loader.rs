//! Configuration file discovery and loading.
//!
//! Files are layered, later overriding earlier:
//! 1. User global config (`~/.config/macboot/config.yml`)
//! 2. Project config (`.macboot.yml`)
//! 3. Explicit `--config` file
//!
//! Mappings merge key by key; lists and scalars are replaced whole.

use crate::config::schema::BootConfig;
use crate::error::{BootError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = ".macboot.yml";

/// Config files found for a run, in merge order.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// `~/.config/macboot/config.yml`, if present.
    pub user_global: Option<PathBuf>,
    /// `<project>/.macboot.yml`, if present.
    pub project: Option<PathBuf>,
    /// Explicitly requested file. Must exist.
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path, explicit: Option<&Path>) -> Self {
        let user_global = dirs::home_dir()
            .map(|home| home.join(".config").join("macboot").join("config.yml"))
            .filter(|p| p.is_file());
        let project = Some(project_root.join(PROJECT_CONFIG_FILE)).filter(|p| p.is_file());

        Self {
            user_global,
            project,
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    /// All paths in merge order.
    pub fn in_order(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.explicit]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Load, merge, render, and validate the configuration for a project.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<BootConfig> {
    let paths = ConfigPaths::discover(project_root, explicit);
    load_from_paths(&paths)
}

/// Load configuration from an already-discovered set of files.
pub fn load_from_paths(paths: &ConfigPaths) -> Result<BootConfig> {
    let mut merged = Value::Mapping(Default::default());
    for path in paths.in_order() {
        tracing::debug!("Loading config layer {}", path.display());
        let layer = load_config_value(path)?;
        merged = overlay(&merged, &layer);
    }

    let source = paths
        .in_order()
        .last()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));

    let config: BootConfig =
        serde_yaml::from_value(merged).map_err(|e| BootError::ConfigParseError {
            path: source,
            message: e.to_string(),
        })?;

    let config = config.render();
    config.validate()?;
    Ok(config)
}

/// Read one config file as a raw YAML value.
///
/// An empty file counts as an empty mapping.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BootError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BootError::Io(e)
        }
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|e| BootError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match value {
        Value::Null => Ok(Value::Mapping(Default::default())),
        Value::Mapping(_) => Ok(value),
        _ => Err(BootError::ConfigParseError {
            path: path.to_path_buf(),
            message: "top level must be a mapping".to_string(),
        }),
    }
}

fn overlay(base: &Value, top: &Value) -> Value {
    match (base, top) {
        (Value::Mapping(base_map), Value::Mapping(top_map)) => {
            let mut out = base_map.clone();
            for (key, value) in top_map {
                let merged = match base_map.get(key) {
                    Some(existing) => overlay(existing, value),
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Mapping(out)
        }
        (_, top) => top.clone(),
    }
}
