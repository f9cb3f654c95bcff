use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `memory.base_dir` when non-empty.
pub const MEMORY_DIR_ENV: &str = "MEMKIT_DIR";

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/memkit.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Directory holding the memory file and the daily logs.
    pub base_dir: String,
    /// File name of the categorized key/value store inside `base_dir`.
    pub memory_file: String,
    /// Default bound used by `memkit trim` when `--max` is not given.
    pub max_per_category: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base_dir: "./memory".to_string(),
            memory_file: "MEMORY.md".to_string(),
            max_per_category: 20,
        }
    }
}

/// Defaults applied to `recall` when the caller does not pass its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    pub limit: usize,
    /// Minimum blended relevance score, inclusive.  Must lie in `[0, 1]`.
    pub threshold: f64,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            threshold: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub memory: MemoryConfig,
    pub recall: RecallConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw)
                .with_context(|| format!("parsing config at {}", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config at {}", path.display()));
            }
        };

        config.apply_dir_override(env::var(MEMORY_DIR_ENV).ok());
        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Replace `memory.base_dir` with `dir` unless it is absent or empty.
    pub fn apply_dir_override(&mut self, dir: Option<String>) {
        if let Some(dir) = dir {
            if !dir.trim().is_empty() {
                self.memory.base_dir = dir;
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_recall_contract() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.recall.limit, 10);
        assert!((cfg.recall.threshold - 0.4).abs() < f64::EPSILON);
        assert_eq!(cfg.memory.base_dir, "./memory");
        assert_eq!(cfg.memory.memory_file, "MEMORY.md");
        assert_eq!(cfg.memory.max_per_category, 20);
        assert_eq!(cfg.telemetry.log_level, "info");
    }

    // ── load_from ──────────────────────────────────────────────────────────

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(cfg.recall.limit, 10);
        assert_eq!(cfg.memory.memory_file, "MEMORY.md");
    }

    #[test]
    fn load_from_partial_toml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(
            &path,
            r#"
[recall]
threshold = 0.25

[telemetry]
log_level = "debug"
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert!((cfg.recall.threshold - 0.25).abs() < f64::EPSILON);
        assert_eq!(cfg.recall.limit, 10);
        assert_eq!(cfg.telemetry.log_level, "debug");
        assert_eq!(cfg.memory.max_per_category, 20);
    }

    #[test]
    fn load_from_unreadable_path_returns_error() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::load_from(dir.path()).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }

    #[test]
    fn load_from_invalid_toml_returns_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn dir_override_ignores_blank_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_dir_override(Some("   ".to_string()));
        assert_eq!(cfg.memory.base_dir, "./memory");
        cfg.apply_dir_override(None);
        assert_eq!(cfg.memory.base_dir, "./memory");
        cfg.apply_dir_override(Some("/srv/agent-memory".to_string()));
        assert_eq!(cfg.memory.base_dir, "/srv/agent-memory");
    }

    // ── save_to + roundtrip ────────────────────────────────────────────────

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub/memkit.toml");

        let mut cfg = AppConfig::default();
        cfg.memory.base_dir = "/data/memory".to_string();
        cfg.memory.max_per_category = 50;
        cfg.recall.limit = 3;

        cfg.save_to(&path).unwrap();
        assert!(path.exists());

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.memory.max_per_category, 50);
        assert_eq!(loaded.recall.limit, 3);
    }
}
