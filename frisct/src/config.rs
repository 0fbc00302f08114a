//! Configuration for the frisct CLI.
//!
//! An optional `frisct.toml` in the working directory supplies the
//! defaults a command falls back to when its flags are absent. CLI flags
//! always win over file values; the stage crates themselves take no
//! configuration at all.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FrisctError, Result};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "frisct.toml";

/// The serialized lex table's conventional location.
fn default_table_path() -> String {
    "enfa.txt".to_string()
}

fn default_true() -> bool {
    true
}

/// Application configuration: global settings plus per-command sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Global verbose setting (same effect as `--verbose`).
    #[serde(default)]
    pub verbose: bool,

    /// Where `lexgen` writes the serialized table and `lex` reads it back.
    #[serde(default = "default_table_path")]
    pub table_path: String,

    /// Lexer-runtime options.
    #[serde(default)]
    pub lex: LexConfig,

    /// Code-generation options.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Options for the `lex` and `lexgen` subcommands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LexConfig {
    /// Overrides the table's recorded starting lex state.
    #[serde(default)]
    pub starting_state: Option<String>,

    /// Whether `lexgen` reports the path it wrote the table to.
    #[serde(default = "default_true")]
    pub echo_table_path: bool,
}

/// Options for the `build` subcommand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BuildConfig {
    /// Where to write the assembly listing; stdout when absent.
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            table_path: default_table_path(),
            lex: LexConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

impl Default for LexConfig {
    fn default() -> Self {
        Self { starting_state: None, echo_table_path: true }
    }
}

impl Config {
    /// Loads `frisct.toml` from the working directory, or the defaults
    /// when no such file exists.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from an explicitly given path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FrisctError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| FrisctError::Config(format!("failed to parse configuration: {e}")))
    }

    /// Saves this configuration, creating parent directories as needed.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| FrisctError::Config(format!("failed to serialize configuration: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(!config.verbose);
        assert_eq!(config.table_path, "enfa.txt");
        assert_eq!(config.lex.starting_state, None);
        assert!(config.lex.echo_table_path);
        assert_eq!(config.build.output, None);
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("frisct.toml");

        let original = Config {
            verbose: true,
            table_path: "tables/lexer.txt".to_string(),
            lex: LexConfig {
                starting_state: Some("S_komentar".to_string()),
                echo_table_path: false,
            },
            build: BuildConfig { output: Some("out.frisc".to_string()) },
        };
        original.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let result = Config::load_from_path(Path::new("/nonexistent/frisct.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("frisct.toml");
        std::fs::write(&config_path, "table_path = \"custom.txt\"\n").unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.table_path, "custom.txt");
        assert!(loaded.lex.echo_table_path);
    }
}
