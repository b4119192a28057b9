//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions and defaults in [`schema`]
//! - File discovery, layering, and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use macboot::config::BootConfig;
//!
//! let config = BootConfig::default().render();
//! assert_eq!(config.runtime.binary, "python3.11");
//! config.validate().unwrap();
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    load_config, load_config_value, load_from_paths, ConfigPaths, PROJECT_CONFIG_FILE,
};
pub use schema::{
    BootConfig, InstallerConfig, ManifestConfig, PackageManagerConfig, RuntimeConfig,
    TimeoutConfig, VERSION_PLACEHOLDER,
};
