//! Key-value storage backends.
//!
//! A [`KvStore`] holds raw string values by key. Typed access, namespacing
//! and the fail-soft read policy live one level up in
//! [`BlocklistCache`](crate::BlocklistCache).

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::Result;

/// Durable string key-value storage.
///
/// Each call performs one read or one write. No read-modify-write
/// transactions are offered.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
