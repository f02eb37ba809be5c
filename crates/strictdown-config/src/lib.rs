use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strictdown_engine::{BoundedSink, Options};
use thiserror::Error;

pub use strictdown_engine::MIN_TAPE_ENTRIES;
/// Smallest output buffer that holds any single rendered unit.
pub const MIN_OUTPUT_CAPACITY: usize = BoundedSink::MIN_CAPACITY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Output flavor as spelled in the config file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    #[default]
    Html,
    Xhtml,
}

impl From<Flavor> for strictdown_engine::Flavor {
    fn from(flavor: Flavor) -> Self {
        match flavor {
            Flavor::Html => strictdown_engine::Flavor::Html,
            Flavor::Xhtml => strictdown_engine::Flavor::Xhtml,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub max_tape_entries: usize,
    pub flavor: Flavor,
    /// Bytes read from the input per feed.
    pub chunk_size: usize,
    /// Capacity of the output buffer in bytes.
    pub output_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_tape_entries: 102_400,
            flavor: Flavor::Html,
            chunk_size: 8192,
            output_capacity: 4096,
        }
    }
}

impl From<&Config> for Options {
    fn from(config: &Config) -> Self {
        Options {
            flavor: config.flavor.into(),
            max_tape_entries: config.max_tape_entries,
            chunk_size: config.chunk_size,
            output_capacity: config.output_capacity,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = Self::expand_path(config_path.as_ref());
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.clone(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.clone(),
                source,
            })?;

        config.validate()?;
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = Self::expand_path(config_path.as_ref());
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/strictdown");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Checks the limits the converter depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tape_entries < MIN_TAPE_ENTRIES {
            return Err(ConfigError::Invalid {
                key: "max_tape_entries",
                reason: format!("{} is below the minimum of {MIN_TAPE_ENTRIES}", self.max_tape_entries),
            });
        }
        if self.output_capacity < MIN_OUTPUT_CAPACITY {
            return Err(ConfigError::Invalid {
                key: "output_capacity",
                reason: format!(
                    "{} is below the minimum of {MIN_OUTPUT_CAPACITY}",
                    self.output_capacity
                ),
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                key: "chunk_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Expands `~` and environment variables, leaving the path as given if
    /// expansion fails.
    fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(_) => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/strictdown/config.toml"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let test_config = Config {
            max_tape_entries: 4096,
            flavor: Flavor::Xhtml,
            chunk_size: 512,
            output_capacity: 64,
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "flavor = \"xhtml\"\n");

        let config = Config::load_from_path(&path).unwrap().unwrap();

        assert_eq!(
            config,
            Config {
                flavor: Flavor::Xhtml,
                ..Config::default()
            }
        );
    }

    #[test]
    fn test_unknown_key_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "notes_path = \"/tmp\"\n");

        let err = Config::load_from_path(&path).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().starts_with("Failed to parse config file at"));
    }

    #[test]
    fn test_unknown_flavor_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "flavor = \"markdown\"\n");

        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_limits_are_validated() {
        let temp_dir = TempDir::new().unwrap();
        for (content, key) in [
            ("max_tape_entries = 63\n", "max_tape_entries"),
            ("output_capacity = 31\n", "output_capacity"),
            ("chunk_size = 0\n", "chunk_size"),
        ] {
            let path = write(&temp_dir, content);
            match Config::load_from_path(&path) {
                Err(ConfigError::Invalid { key: found, .. }) => assert_eq!(found, key),
                other => panic!("expected invalid {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_minimums_are_accepted() {
        let config = Config {
            max_tape_entries: MIN_TAPE_ENTRIES,
            output_capacity: MIN_OUTPUT_CAPACITY,
            chunk_size: 1,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_matches_engine_options() {
        assert_eq!(Options::from(&Config::default()), Options::default());
    }

    #[test]
    fn test_converts_to_engine_options() {
        let config = Config {
            max_tape_entries: 256,
            flavor: Flavor::Xhtml,
            chunk_size: 7,
            output_capacity: 40,
        };
        assert_eq!(
            Options::from(&config),
            Options {
                flavor: strictdown_engine::Flavor::Xhtml,
                max_tape_entries: 256,
                chunk_size: 7,
                output_capacity: 40,
            }
        );
    }

    #[test]
    fn test_minimums_follow_engine() {
        assert_eq!(MIN_TAPE_ENTRIES, strictdown_engine::MIN_TAPE_ENTRIES);
        assert_eq!(MIN_OUTPUT_CAPACITY, BoundedSink::MIN_CAPACITY);
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("STRICTDOWN_TEST_DIR", "/test/env/path");
        }

        let path = PathBuf::from("$STRICTDOWN_TEST_DIR/config.toml");
        let expanded = Config::expand_path(&path);

        assert_eq!(expanded, PathBuf::from("/test/env/path/config.toml"));

        unsafe {
            env::remove_var("STRICTDOWN_TEST_DIR");
        }
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(Path::new("~/test/path"));

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with("test/path"));
    }

    #[test]
    fn test_unset_variable_leaves_path_alone() {
        let path = PathBuf::from("$STRICTDOWN_UNSET_VARIABLE/config.toml");
        assert_eq!(Config::expand_path(&path), path);
    }
}
