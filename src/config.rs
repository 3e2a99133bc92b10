// Store directory layout and optional YAML configuration

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CURRENT_VERSION: u32 = 1;

/// Name of the data directory created under the base path
pub const STORE_DIR: &str = ".taskpad";

pub const CONFIG_FILE: &str = "config.yml";

/// Key-value backend holding the persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Files,
}

/// Named work/break pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerPreset {
    pub name: String,
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl TimerPreset {
    fn new(name: &str, work_minutes: u32, break_minutes: u32) -> Self {
        Self {
            name: name.to_string(),
            work_minutes,
            break_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub presets: Vec<TimerPreset>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
            presets: vec![
                TimerPreset::new("pomodoro", 25, 5),
                TimerPreset::new("short", 15, 3),
                TimerPreset::new("long", 50, 10),
            ],
        }
    }
}

impl TimerConfig {
    pub fn preset(&self, name: &str) -> Option<&TimerPreset> {
        self.presets.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub timer: TimerConfig,
    /// Directory for CSV exports, current directory when unset
    pub export_dir: Option<PathBuf>,
}

impl Config {
    /// Read `config.yml` from the store directory, defaults when absent
    pub fn load(store_dir: &Path) -> Result<Self> {
        let path = store_dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!(file = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {:?}", path))?;
        info!(file = ?path, backend = ?config.backend, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timer.work_minutes == 0 || self.timer.break_minutes == 0 {
            return Err(eyre!("timer durations must be positive"));
        }
        if let Some(p) = self.timer.presets.iter().find(|p| p.work_minutes == 0 || p.break_minutes == 0) {
            return Err(eyre!("timer preset '{}' has a zero duration", p.name));
        }
        Ok(())
    }
}

/// Base path used when none is given on the command line
pub fn default_base_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("taskpad"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Create (if needed) and return the store directory under `base`
pub fn open_store_dir<P: AsRef<Path>>(base: P) -> Result<PathBuf> {
    let dir = base.as_ref().join(STORE_DIR);
    fs::create_dir_all(&dir).context("Failed to create store directory")?;

    let version_path = dir.join(".version");
    if !version_path.exists() {
        fs::write(&version_path, CURRENT_VERSION.to_string())?;
    }

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.timer.work_minutes, 25);
        assert_eq!(config.timer.break_minutes, 5);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("backend: files\ntimer:\n  work_minutes: 45\n").unwrap();
        assert_eq!(config.backend, Backend::Files);
        assert_eq!(config.timer.work_minutes, 45);
        assert_eq!(config.timer.break_minutes, 5);
        assert!(config.timer.preset("pomodoro").is_some());
        assert_eq!(config.export_dir, None);
    }

    #[test]
    fn test_custom_presets() {
        let yaml = r#"
timer:
  presets:
    - name: deep
      work_minutes: 90
      break_minutes: 20
export_dir: /tmp/exports
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let deep = config.timer.preset("deep").unwrap();
        assert_eq!((deep.work_minutes, deep.break_minutes), (90, 20));
        assert!(config.timer.preset("pomodoro").is_none());
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/exports")));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "backend: postgres\n").unwrap();
        assert!(Config::load(temp.path()).is_err());

        assert!(Config::from_yaml("timer:\n  break_minutes: 0\n").is_err());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_open_store_dir_creates_layout() {
        let temp = TempDir::new().unwrap();
        let dir = open_store_dir(temp.path()).unwrap();
        assert_eq!(dir, temp.path().join(".taskpad"));
        assert!(dir.join(".version").exists());

        // Opening again is harmless
        open_store_dir(temp.path()).unwrap();
    }
}
