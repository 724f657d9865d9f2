//! Credential storage
//!
//! The client keeps the session in a small string key-value store, the same
//! shape as the browser's `localStorage`. Native builds persist to a JSON file,
//! browser builds use `localStorage` directly, tests use [`MemoryStore`].

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors raised by credential store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid credential file contents: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("credential storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string key-value store holding the session
pub trait CredentialStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace a value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value; removing an absent key is not an error
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
