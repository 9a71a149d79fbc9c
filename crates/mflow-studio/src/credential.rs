//! Credential gate.

use mflow_genai::ApiKeyStore;

/// Answers whether a usable API credential is configured.
///
/// Acquiring a missing credential is left to the caller; once it is stored,
/// the run is re-entered with [`Studio::resume_after_credential`].
///
/// [`Studio::resume_after_credential`]: crate::Studio::resume_after_credential
#[cfg_attr(test, mockall::automock)]
pub trait CredentialGate: Send + Sync {
    fn has_credential(&self) -> bool;
}

/// Gate backed by the client's shared key store.
#[derive(Debug, Clone)]
pub struct KeyStoreGate {
    store: ApiKeyStore,
}

impl KeyStoreGate {
    pub fn new(store: ApiKeyStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ApiKeyStore {
        &self.store
    }
}

impl CredentialGate for KeyStoreGate {
    fn has_credential(&self) -> bool {
        self.store.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_store_gate_follows_store() {
        let store = ApiKeyStore::new(None);
        let gate = KeyStoreGate::new(store.clone());
        assert!(!gate.has_credential());

        store.set("key");
        assert!(gate.has_credential());
    }
}
