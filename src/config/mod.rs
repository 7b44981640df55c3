use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{ensure_dir, PathResolver},
    currency::{CurrencyCode, CurrencyFormatter, LocaleConfig},
    errors::{MoniError, Result},
    storage::json_backend::save_text_to_path,
};

/// Slot key used by the browser build, kept so its backups stay compatible.
pub const DEFAULT_STORAGE_KEY: &str = "moni_data_v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub storage_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "es-AR".into(),
            currency: "ARS".into(),
            storage_key: DEFAULT_STORAGE_KEY.into(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn formatter(&self) -> CurrencyFormatter {
        CurrencyFormatter::new(
            CurrencyCode::new(&self.currency),
            LocaleConfig::for_tag(&self.locale),
        )
    }

    /// Directory holding the data slot: the configured override, else `<base>/data`.
    pub fn data_dir_in(&self, base: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathResolver::data_dir_in(base))
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            MoniError::Config(format!("{}: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if config.storage_key.trim().is_empty() {
            return Err(MoniError::Config("storage key must not be empty".into()));
        }
        let json = serde_json::to_string_pretty(config)?;
        save_text_to_path(&self.path, &json)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
