//! # Configuration
//!
//! Settings are read once, when a [`Configuration`](crate::api::Configuration)
//! is opened, and are fixed for its lifetime. Loading is handled by
//! [`confique`], layering environment variables and TOML files over compiled
//! defaults.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `QC_CONSISTENCY_CHECK`, `QC_SCHEMA_VARIANT`.
//! 2. **Explicit file**: `qcapacity.toml` in the directory passed to [`QcConfig::load`].
//! 3. **User config**: OS-appropriate config directory (via `directories` crate).
//! 4. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `consistency_check` | `false` | Reject values that contradict an earlier source |
//! | `schema_variant` | `current` | `current` or `v1` attribute naming |

use std::path::Path;

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::attributes::SchemaVariant;
use crate::error::Result;

pub const CONFIG_FILENAME: &str = "qcapacity.toml";

/// Construction-time settings of a configuration, stored in `qcapacity.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QcConfig {
    /// Reject a value that disagrees with one an earlier source already stored.
    #[config(default = false, env = "QC_CONSISTENCY_CHECK")]
    pub consistency_check: bool,

    /// Attribute naming convention: "current" or "v1".
    #[config(default = "current", env = "QC_SCHEMA_VARIANT")]
    pub schema_variant: SchemaVariant,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            consistency_check: false,
            schema_variant: SchemaVariant::Current,
        }
    }
}

impl QcConfig {
    /// Loads settings from the environment, `dir/qcapacity.toml` (if `dir` is
    /// given), the user config directory, then defaults. Missing files are
    /// skipped.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut builder = QcConfig::builder().env();
        if let Some(dir) = dir {
            builder = builder.file(dir.join(CONFIG_FILENAME));
        }
        if let Some(dirs) = ProjectDirs::from("", "", "qcapacity") {
            builder = builder.file(dirs.config_dir().join(CONFIG_FILENAME));
        }
        Ok(builder.load()?)
    }

    /// Loads settings from a single file over the defaults, ignoring the
    /// environment.
    pub fn load_file(path: &Path) -> Result<Self> {
        Ok(QcConfig::builder().file(path).load()?)
    }

    /// Turns the cross-source consistency check on or off.
    pub fn with_consistency_check(mut self, enabled: bool) -> Self {
        self.consistency_check = enabled;
        self
    }

    /// Selects the attribute naming used by every layer of the configuration.
    pub fn with_schema_variant(mut self, variant: SchemaVariant) -> Self {
        self.schema_variant = variant;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests that touch process environment variables take this lock.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: [&str; 2] = ["QC_CONSISTENCY_CHECK", "QC_SCHEMA_VARIANT"];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = QcConfig::default();
        assert!(!config.consistency_check);
        assert_eq!(config.schema_variant, SchemaVariant::Current);
    }

    #[test]
    fn test_builder_helpers() {
        let config = QcConfig::default()
            .with_consistency_check(true)
            .with_schema_variant(SchemaVariant::V1);
        assert!(config.consistency_check);
        assert_eq!(config.schema_variant, SchemaVariant::V1);
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let wanted = QcConfig {
            consistency_check: true,
            schema_variant: SchemaVariant::V1,
        };
        std::fs::write(&path, toml::to_string(&wanted).unwrap()).unwrap();

        assert_eq!(QcConfig::load_file(&path).unwrap(), wanted);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "consistency_check = true\n").unwrap();

        let config = QcConfig::load_file(&path).unwrap();
        assert!(config.consistency_check);
        assert_eq!(config.schema_variant, SchemaVariant::Current);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = QcConfig::load_file(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, QcConfig::default());
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "schema_variant = \"v9\"\n").unwrap();
        assert!(QcConfig::load_file(&path).is_err());
    }

    #[test]
    fn test_load_reads_file_from_dir() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "consistency_check = true\nschema_variant = \"v1\"\n",
        )
        .unwrap();

        let config = QcConfig::load(Some(dir.path())).unwrap();
        assert!(config.consistency_check);
        assert_eq!(config.schema_variant, SchemaVariant::V1);
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "consistency_check = true\nschema_variant = \"v1\"\n",
        )
        .unwrap();

        std::env::set_var("QC_SCHEMA_VARIANT", "current");
        std::env::set_var("QC_CONSISTENCY_CHECK", "false");
        let config = QcConfig::load(Some(dir.path()));
        clear_env();

        let config = config.unwrap();
        assert!(!config.consistency_check);
        assert_eq!(config.schema_variant, SchemaVariant::Current);
    }

    #[test]
    fn test_env_alone_over_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        std::env::set_var("QC_SCHEMA_VARIANT", "v1");
        let config = QcConfig::load(Some(dir.path()));
        clear_env();

        let config = config.unwrap();
        assert!(!config.consistency_check);
        assert_eq!(config.schema_variant, SchemaVariant::V1);
    }
}
