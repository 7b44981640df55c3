#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use moni_core::{config::ConfigManager, core::store::DataStore, storage::json_backend::JsonStorage};
use once_cell::sync::Lazy;
use tempfile::TempDir;

pub const KEY: &str = "moni_data_v1";

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a store over the JSON slot inside `base`.
pub fn open_store(base: &Path) -> DataStore {
    let storage = JsonStorage::new(Some(base.join("data"))).expect("create json storage backend");
    DataStore::open(Box::new(storage), KEY)
}

/// Creates an isolated store and config manager sharing one directory.
pub fn setup_test_env() -> (DataStore, ConfigManager, PathBuf) {
    let base = temp_base();
    let store = open_store(&base);
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (store, config_manager, base)
}
