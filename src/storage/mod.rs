pub mod json_backend;
pub mod memory;

use std::sync::Arc;

use crate::errors::Result;

/// Abstraction over a named key-value slot that holds one serialized blob.
///
/// Writes replace the whole value; readers never observe a partial write.
pub trait StorageBackend: Send + Sync {
    /// Returns the stored text, or `None` when nothing was ever written.
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, data: &str) -> Result<()>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, data: &str) -> Result<()> {
        (**self).write(key, data)
    }
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
