use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::store::DEFAULT_KEY;
use crate::tracker::EditMode;

const APP_DIR: &str = "tasktrack";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub storage_key: String,
    pub edit_mode: EditMode,
    pub log_level: String,
    /// File the settings came from; `None` means built-in defaults.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: DEFAULT_KEY.to_string(),
            edit_mode: EditMode::default(),
            log_level: "warn".to_string(),
            loaded_from: None,
        }
    }
}

impl Config {
    /// Reads `path`, or the per-user config file when none is given. A
    /// missing per-user file yields the defaults; a missing explicit one is
    /// an error. Runs before logging is set up, so the outcome is recorded
    /// in `loaded_from` instead of logged here.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        let mut cfg =
            Self::parse(&raw).with_context(|| format!("failed parsing {}", path.display()))?;
        cfg.loaded_from = Some(path);
        Ok(cfg)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = toml::from_str(raw)?;
        if cfg.storage_key.trim().is_empty() {
            return Err(anyhow!("storage_key must not be empty"));
        }
        Ok(cfg)
    }

    /// `--data` beats the config file, which beats the platform default.
    pub fn resolve_data_dir(&self, cli_override: Option<&Path>) -> anyhow::Result<PathBuf> {
        if let Some(dir) = cli_override {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or_else(|| anyhow!("could not determine a data directory; pass --data"))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}
