use std::sync::Arc;

use tracing::debug;

use crate::store::{keys, KeyValueStore, StorageError};

/// Snapshot of the session as read from the durable store.
///
/// Not authoritative beyond the moment it was read; the store is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
}

impl Session {
    pub fn is_present(&self) -> bool {
        self.token.is_some()
    }
}

/// Owner of the bearer token.
///
/// Clone is cheap; all clones share the same underlying store. Readers go to
/// the store every time rather than caching the token.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the persisted session at startup
    pub fn init(&self) -> Result<Session, StorageError> {
        let session = Session {
            token: self.token()?,
        };
        debug!(has_token = session.is_present(), "Session store initialized");
        Ok(session)
    }

    /// Current bearer token. A blank stored value counts as no token.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .store
            .get(keys::TOKEN)?
            .filter(|t| !t.trim().is_empty()))
    }

    /// True when a token can be read. Storage failures count as no token.
    pub fn has_token(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    pub fn save_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(keys::TOKEN, token)
    }

    /// Remove the token. Safe to call when no token is stored.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::TOKEN)
    }

    /// End-of-process hook. Every write is already durable, so this only
    /// logs; it never removes the persisted token.
    pub fn teardown(&self) {
        debug!(has_token = self.has_token(), "Session store teardown");
    }

    /// The backing store, shared with preferences
    pub fn backing_store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn session_store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_init_without_token() {
        let session = session_store().init().unwrap();
        assert_eq!(session, Session { token: None });
        assert!(!session.is_present());
    }

    #[test]
    fn test_save_then_read() {
        let sessions = session_store();
        sessions.save_token("abc").unwrap();
        assert_eq!(sessions.token().unwrap().as_deref(), Some("abc"));
        assert!(sessions.init().unwrap().is_present());
    }

    #[test]
    fn test_blank_token_is_absent() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::with_entries([(keys::TOKEN, "  ")])));
        assert_eq!(sessions.token().unwrap(), None);
        assert!(!sessions.has_token());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let sessions = session_store();
        sessions.save_token("abc").unwrap();
        sessions.clear().unwrap();
        sessions.clear().unwrap();
        assert_eq!(sessions.token().unwrap(), None);
    }

    #[test]
    fn test_clones_share_store() {
        let sessions = session_store();
        let other = sessions.clone();
        sessions.save_token("shared").unwrap();
        assert_eq!(other.token().unwrap().as_deref(), Some("shared"));
        other.clear().unwrap();
        assert!(!sessions.has_token());
    }

    #[test]
    fn test_teardown_keeps_token() {
        let sessions = session_store();
        sessions.save_token("abc").unwrap();
        sessions.teardown();
        assert!(sessions.has_token());
    }
}
