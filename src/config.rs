//! Configuration loading for BreakVault.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. User config (`~/.breakvault/config.toml`)
//! 3. Defaults (lowest priority)
//!
//! All configuration is optional. The CLI runs with sensible defaults when
//! no config exists, and `--data-file` overrides the storage path on top of
//! everything.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{FailOpen, Result, VaultError};
use crate::util::read_to_string_limited;

/// Main configuration struct for BreakVault.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the vault document lives.
    pub storage: StorageConfig,
    /// Combo generator bounds.
    pub generator: GeneratorConfig,
    /// Example data behaviour.
    pub seed: SeedConfig,
    /// Goal tracking defaults.
    pub goals: GoalsConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Explicit vault file. `None` means `<vault home>/vault.json`.
    pub data_file: Option<PathBuf>,
}

/// Combo generator bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Shortest combo the random generator produces.
    pub min_length: usize,
    /// Longest combo the random generator produces.
    pub max_length: usize,
}

/// Smallest valid `min_length`.
pub const MIN_COMBO_LENGTH: usize = 1;

impl GeneratorConfig {
    /// Check that the bounds describe a non-empty range starting at 1 or more.
    pub fn is_valid(&self) -> bool {
        self.min_length >= MIN_COMBO_LENGTH && self.max_length >= self.min_length
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 6,
        }
    }
}

/// Example data behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeedConfig {
    /// Prepopulate example moves, tags and combos on first run, reset and import.
    pub example_data: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { example_data: true }
    }
}

/// Goal tracking defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoalsConfig {
    /// Unit used for new stages when none is given.
    pub default_unit: String,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            default_unit: "reps".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with the full precedence chain.
    pub fn load() -> Self {
        Self::load_with_home(vault_home().as_deref())
    }

    /// Load configuration using a specific vault home directory.
    pub fn load_with_home(home: Option<&Path>) -> Self {
        let mut config = Config::default();

        if let Some(home) = home {
            let config_path = home.join("config.toml");
            if config_path.exists() {
                let user_config = Self::load_from_file(&config_path)
                    .map(Some)
                    .fail_open_default("loading user config");
                if let Some(user_config) = user_config {
                    config = config.merge(user_config);
                }
            }
        }

        config.apply_env_overrides();
        config
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = read_to_string_limited(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| VaultError::config(e.to_string()))?;

        if !config.generator.is_valid() {
            return Err(VaultError::config(format!(
                "generator bounds must satisfy 1 <= min_length <= max_length (got {}..={})",
                config.generator.min_length, config.generator.max_length
            )));
        }

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // BREAKVAULT_DATA_FILE
        if let Ok(val) = env::var("BREAKVAULT_DATA_FILE") {
            if val.trim().is_empty() {
                eprintln!("Warning: BREAKVAULT_DATA_FILE is empty. Using the default vault file.");
            } else {
                self.storage.data_file = Some(PathBuf::from(val));
            }
        }

        // BREAKVAULT_MAX_COMBO_LENGTH
        if let Ok(val) = env::var("BREAKVAULT_MAX_COMBO_LENGTH") {
            match val.parse::<usize>() {
                Ok(n) if n >= self.generator.min_length => self.generator.max_length = n,
                Ok(n) => eprintln!(
                    "Warning: Invalid BREAKVAULT_MAX_COMBO_LENGTH value '{}'. \
                    Must be >= {}. Using default '{}'.",
                    n, self.generator.min_length, self.generator.max_length
                ),
                Err(_) => eprintln!(
                    "Warning: Invalid BREAKVAULT_MAX_COMBO_LENGTH value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.generator.max_length
                ),
            }
        }

        // BREAKVAULT_SEED_EXAMPLES
        if let Ok(val) = env::var("BREAKVAULT_SEED_EXAMPLES") {
            self.seed.example_data = val == "true" || val == "1";
        }
    }

    /// Merge another config into this one.
    ///
    /// Non-default values from `other` win, field by field. A layer cannot
    /// set a value back to its default to undo a lower layer.
    fn merge(mut self, other: Config) -> Self {
        if other.storage.data_file.is_some() {
            self.storage.data_file = other.storage.data_file;
        }

        let default_generator = GeneratorConfig::default();
        if other.generator.min_length != default_generator.min_length {
            self.generator.min_length = other.generator.min_length;
        }
        if other.generator.max_length != default_generator.max_length {
            self.generator.max_length = other.generator.max_length;
        }

        if other.seed.example_data != SeedConfig::default().example_data {
            self.seed.example_data = other.seed.example_data;
        }

        if other.goals.default_unit != GoalsConfig::default().default_unit {
            self.goals.default_unit = other.goals.default_unit;
        }

        self
    }

    /// Resolve the vault document path.
    ///
    /// Explicit config wins, then `<vault home>/vault.json`.
    pub fn data_file_path(&self) -> Option<PathBuf> {
        self.storage
            .data_file
            .clone()
            .or_else(|| vault_home().map(|h| h.join("vault.json")))
    }
}

/// Get the BreakVault home directory.
///
/// Checks `BREAKVAULT_HOME` first, then falls back to `~/.breakvault`.
/// Empty values are ignored.
pub fn vault_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("BREAKVAULT_HOME") {
        if home.is_empty() {
            tracing::warn!("BREAKVAULT_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("BREAKVAULT_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".breakvault"));
    }

    let fallback_path = fallback_vault_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Fallback home when HOME is unavailable.
#[cfg(unix)]
fn fallback_vault_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/breakvault-{}", uid))
}

/// Fallback home when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_vault_home() -> PathBuf {
    std::env::temp_dir().join("breakvault")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        env::remove_var("BREAKVAULT_DATA_FILE");
        env::remove_var("BREAKVAULT_MAX_COMBO_LENGTH");
        env::remove_var("BREAKVAULT_SEED_EXAMPLES");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.data_file.is_none());
        assert_eq!(config.generator.min_length, 1);
        assert_eq!(config.generator.max_length, 6);
        assert!(config.seed.example_data);
        assert_eq!(config.goals.default_unit, "reps");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_content = r#"
[generator]
max_length = 8
"#;

        let config: Config = toml::from_str(toml_content).unwrap();

        assert_eq!(config.generator.max_length, 8);
        assert_eq!(config.generator.min_length, 1);
        assert!(config.seed.example_data);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[storage]
data_file = "/data/vault.json"

[seed]
example_data = false

[goals]
default_unit = "rounds"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert_eq!(
            config.storage.data_file,
            Some(PathBuf::from("/data/vault.json"))
        );
        assert!(!config.seed.example_data);
        assert_eq!(config.goals.default_unit, "rounds");
    }

    #[test]
    fn test_load_from_file_rejects_inverted_bounds() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[generator]\nmin_length = 5\nmax_length = 2\n",
        )
        .unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(VaultError::Config { .. })));
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        assert!(Config::load_from_file(&config_path).is_err());
    }

    #[test]
    #[serial]
    fn test_load_with_home_reads_user_config() {
        clear_env();
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "[generator]\nmax_length = 4\n",
        )
        .unwrap();

        let config = Config::load_with_home(Some(dir.path()));

        assert_eq!(config.generator.max_length, 4);
    }

    #[test]
    #[serial]
    fn test_load_with_home_ignores_broken_config() {
        clear_env();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[[[ nope").unwrap();

        let config = Config::load_with_home(Some(dir.path()));

        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "[generator]\nmax_length = 4\n",
        )
        .unwrap();

        env::set_var("BREAKVAULT_MAX_COMBO_LENGTH", "10");
        let config = Config::load_with_home(Some(dir.path()));
        clear_env();

        assert_eq!(config.generator.max_length, 10);
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_max_length_ignored() {
        clear_env();
        env::set_var("BREAKVAULT_MAX_COMBO_LENGTH", "0");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.generator.max_length, 6);

        env::set_var("BREAKVAULT_MAX_COMBO_LENGTH", "lots");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.generator.max_length, 6);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_seed_and_data_file() {
        clear_env();
        env::set_var("BREAKVAULT_SEED_EXAMPLES", "0");
        env::set_var("BREAKVAULT_DATA_FILE", "/tmp/elsewhere.json");

        let mut config = Config::default();
        config.apply_env_overrides();
        clear_env();

        assert!(!config.seed.example_data);
        assert_eq!(
            config.storage.data_file,
            Some(PathBuf::from("/tmp/elsewhere.json"))
        );
    }

    #[test]
    fn test_merge_field_by_field() {
        let base = Config {
            generator: GeneratorConfig {
                min_length: 2,
                max_length: 6,
            },
            ..Config::default()
        };
        let other = Config {
            generator: GeneratorConfig {
                min_length: 1,
                max_length: 9,
            },
            seed: SeedConfig {
                example_data: false,
            },
            ..Config::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.generator.min_length, 2);
        assert_eq!(merged.generator.max_length, 9);
        assert!(!merged.seed.example_data);
    }

    #[test]
    fn test_data_file_path_prefers_explicit_setting() {
        let config = Config {
            storage: StorageConfig {
                data_file: Some(PathBuf::from("/explicit/vault.json")),
            },
            ..Config::default()
        };

        assert_eq!(
            config.data_file_path(),
            Some(PathBuf::from("/explicit/vault.json"))
        );
    }

    #[test]
    #[serial]
    fn test_vault_home_env_override() {
        let dir = TempDir::new().unwrap();
        env::set_var("BREAKVAULT_HOME", dir.path());
        let home = vault_home();
        env::remove_var("BREAKVAULT_HOME");

        assert_eq!(home, Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_generator_config_validity() {
        assert!(GeneratorConfig::default().is_valid());
        assert!(!GeneratorConfig {
            min_length: 0,
            max_length: 3
        }
        .is_valid());
        assert!(!GeneratorConfig {
            min_length: 4,
            max_length: 3
        }
        .is_valid());
    }
}
