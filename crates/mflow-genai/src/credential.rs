//! Shared API credential.

use std::sync::{Arc, PoisonError, RwLock};

/// Holds the API key used by the client.
///
/// Cloned handles share one slot, so a key acquired interactively after the
/// client was built is picked up by the next request.
#[derive(Clone, Default)]
pub struct ApiKeyStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl ApiKeyStore {
    pub fn new(key: Option<String>) -> Self {
        let store = Self::default();
        if let Some(key) = key {
            store.set(key);
        }
        store
    }

    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store a key. Blank keys clear the slot.
    pub fn set(&self, key: impl Into<String>) {
        let key = key.into();
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = if key.trim().is_empty() {
            None
        } else {
            Some(key.trim().to_string())
        };
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for ApiKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyStore")
            .field("is_set", &self.is_set())
            .finish()
    }
}
