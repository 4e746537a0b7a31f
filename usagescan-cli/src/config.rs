use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use usagescan_core::FileLimits;
use usagescan_core::validation::DEFAULT_MAX_FILE_SIZE;
use usagescan_upload::{ArchiveSettings, RuntimeEnvironment};

use crate::state::usagescan_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub upload: UploadSection,
    #[serde(default)]
    pub archive: ArchiveSettings,
    #[serde(default)]
    pub runtime: RuntimeSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSection {
    pub max_size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSection {
    pub environment: RuntimeEnvironment,
    /// Used when RUST_LOG is not set
    pub log_level: String,
}

impl Default for UploadSection {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::Development,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn file_limits(&self) -> FileLimits {
        FileLimits {
            max_size_bytes: self.upload.max_size_bytes,
        }
    }
}

/// Resolve the config path without touching the filesystem.
pub fn config_path() -> Result<PathBuf> {
    Ok(usagescan_home()?.join("config.toml"))
}

/// Load `~/.usagescan/config.toml`, then apply archive env overrides.
pub fn load_config() -> Result<Config> {
    let mut cfg = load_config_from(&config_path()?)?;
    cfg.archive = cfg.archive.with_env_overrides();
    Ok(cfg)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

/// Write `cfg` to `p`, creating the parent directory when missing.
pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    if let Some(dir) = p.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.file_limits().max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.archive.bucket, "csv-upload-bucket");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(
            &p,
            "[runtime]\nenvironment = \"production\"\nlog_level = \"debug\"\n\n[archive]\nbucket = \"meters\"\ntable = \"uploads\"\nregion = \"eu-west-1\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.runtime.environment, RuntimeEnvironment::Production);
        assert_eq!(cfg.runtime.log_level, "debug");
        assert_eq!(cfg.archive.region, "eu-west-1");
        assert_eq!(cfg.upload.max_size_bytes, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.upload.max_size_bytes = 2048;
        save_config_to(&cfg, &p).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), cfg);
    }

    #[test]
    fn test_load_does_not_create_directories() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join(".usagescan");
        let cfg = load_config_from(&home.join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(!home.exists());

        save_config_to(&cfg, &home.join("config.toml")).unwrap();
        assert!(home.join("config.toml").exists());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[upload]\nmax_size_bytes = \"lots\"\n").unwrap();
        assert!(load_config_from(&p).is_err());
    }
}
