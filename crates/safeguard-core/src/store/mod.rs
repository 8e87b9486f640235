//! Durable key-value storage.
//!
//! The session token and the user preferences live behind the
//! `KeyValueStore` capability. Three backends are provided:
//!
//! - `FileStore`: a JSON map on disk, written through on every change
//! - `KeyringStore`: one OS keychain entry per key
//! - `MemoryStore`: process-local, used by tests and ephemeral runs

pub mod file;
pub mod keychain;
pub mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::config::StoreBackend;

pub use self::file::FileStore;
pub use self::keychain::KeyringStore;
pub use self::memory::MemoryStore;

/// Keys used in the durable store. Shared with stores written by the
/// mobile client.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const NOTIFICATIONS: &str = "notificacoes";
    pub const DARK_MODE: &str = "modoEscuro";
    pub const LANGUAGE: &str = "idioma";
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store file: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// String-keyed durable storage.
///
/// Every `set` and `remove` is durable when it returns; there is no separate
/// flush step. Removing an absent key is not an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Open the configured backend. `data_dir` is only used by the file store.
pub fn open(backend: StoreBackend, data_dir: PathBuf) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    let store: Arc<dyn KeyValueStore> = match backend {
        StoreBackend::File => Arc::new(FileStore::open(data_dir.join(file::STORE_FILE))?),
        StoreBackend::Keyring => Arc::new(KeyringStore::new()),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

/// Suffix given to a store file that could not be parsed
pub const CORRUPT_SUFFIX: &str = "corrupt";

/// Like `open`, but never fails.
///
/// An unparsable store file is moved aside and replaced by an empty one. If
/// the backend still cannot be opened the session runs on a `MemoryStore`,
/// logged out and with default preferences.
pub fn open_or_recover(backend: StoreBackend, data_dir: PathBuf) -> Arc<dyn KeyValueStore> {
    let err = match open(backend, data_dir.clone()) {
        Ok(store) => return store,
        Err(e) => e,
    };
    warn!(?backend, error = %err, "Could not open local storage");

    if backend == StoreBackend::File && matches!(err, StorageError::Corrupt(_)) {
        let path = data_dir.join(file::STORE_FILE);
        let aside = path.with_extension(format!("json.{}", CORRUPT_SUFFIX));
        match std::fs::rename(&path, &aside) {
            Ok(()) => {
                warn!(moved_to = %aside.display(), "Moved unreadable store file aside");
                match FileStore::open(path) {
                    Ok(store) => return Arc::new(store),
                    Err(e) => warn!(error = %e, "Could not reopen store file"),
                }
            }
            Err(e) => warn!(error = %e, "Could not move unreadable store file"),
        }
    }

    warn!("Falling back to in-memory storage; nothing will persist");
    Arc::new(MemoryStore::new())
}

/// A store whose every call fails
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Poisoned)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Poisoned)
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Poisoned)
    }
}
