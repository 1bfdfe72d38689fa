//! Harness configuration stored as TOML.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Config file consulted by the CLI when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "srimrun.toml";

/// Harness configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable
/// and automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarnessConfig {
    /// SRIM installation directory (must contain `TRIM.exe`).
    pub srim_dir: PathBuf,

    /// Arena under which per-run scratch dirs are created.
    pub scratch_root: PathBuf,

    /// Keep scratch dirs after harvesting instead of removing them.
    pub keep_scratch: bool,

    /// Worker threads for fragment execution. 0 picks one per core.
    pub threads: usize,

    /// Per-launch wall-clock budget in seconds.
    pub launch_timeout_secs: u64,

    /// Truncate captured child stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            srim_dir: env::temp_dir().join("srim"),
            scratch_root: env::temp_dir().join("srimrun"),
            keep_scratch: false,
            threads: 0,
            launch_timeout_secs: 3600,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.srim_dir.as_os_str().is_empty() {
            return Err(anyhow!("srim_dir must not be empty"));
        }
        if self.scratch_root.as_os_str().is_empty() {
            return Err(anyhow!("scratch_root must not be empty"));
        }
        if self.launch_timeout_secs == 0 {
            return Err(anyhow!("launch_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `HarnessConfig::default()`.
pub fn load_config(path: &Path) -> Result<HarnessConfig> {
    if !path.exists() {
        let cfg = HarnessConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HarnessConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &HarnessConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, HarnessConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        let cfg = HarnessConfig {
            srim_dir: temp.path().join("srim"),
            threads: 4,
            keep_scratch: true,
            ..HarnessConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = HarnessConfig {
            launch_timeout_secs: 0,
            ..HarnessConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
