use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".moni";
const DATA_DIR: &str = "data";
const EXPORT_DIR: &str = "exports";
const CONFIG_FILE: &str = "config.json";
pub const HOME_ENV: &str = "MONI_HOME";

/// Resolves the on-disk layout rooted at the application directory.
pub struct PathResolver;

impl PathResolver {
    /// Returns the application directory, defaulting to `~/.moni`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn data_dir_in(base: &Path) -> PathBuf {
        base.join(DATA_DIR)
    }

    pub fn export_dir_in(base: &Path) -> PathBuf {
        base.join(EXPORT_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_hangs_off_the_base_dir() {
        let base = PathBuf::from("/tmp/moni-layout");
        assert_eq!(PathResolver::data_dir_in(&base), base.join("data"));
        assert_eq!(PathResolver::config_file_in(&base), base.join("config.json"));
        assert_eq!(
            PathResolver::resolve_base(Some(base.clone())),
            base
        );
    }
}
