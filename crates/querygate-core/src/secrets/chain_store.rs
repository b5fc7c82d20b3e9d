//! Chained secret store with fallback

use std::sync::Arc;

use super::traits::{SecretInfo, SecretStore, SecretStoreError, SecretStoreResult};

/// Tries each store in order on reads; writes go to one designated store
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
    write_index: usize,
}

impl ChainSecretStore {
    /// Writes go to the first store
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self {
            stores,
            write_index: 0,
        }
    }

    /// `None` when `write_index` is out of range
    pub fn with_write_store(stores: Vec<Arc<dyn SecretStore>>, write_index: usize) -> Option<Self> {
        (write_index < stores.len()).then_some(Self {
            stores,
            write_index,
        })
    }

    pub fn stores(&self) -> &[Arc<dyn SecretStore>] {
        &self.stores
    }

    /// First available store holding `key`
    pub fn find_store(&self, key: &str) -> Option<&Arc<dyn SecretStore>> {
        self.stores
            .iter()
            .find(|s| s.is_available() && s.has(key))
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn is_available(&self) -> bool {
        self.stores.iter().any(|s| s.is_available())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.stores
            .iter()
            .filter(|s| s.is_available())
            .find_map(|s| s.get(key))
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        match self.stores.get(self.write_index) {
            Some(store) => store.store(key, value),
            None => Err(SecretStoreError::NotAvailable("empty chain".to_string())),
        }
    }

    /// Removes the key from every store that can delete it
    ///
    /// Read-only stores keep their copy; any other store error is returned.
    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        let mut held = false;
        let mut deleted_any = false;
        for store in self.stores.iter().filter(|s| s.has(key)) {
            held = true;
            match store.delete(key) {
                Ok(()) => deleted_any = true,
                Err(SecretStoreError::ReadOnly) => {}
                Err(e) => return Err(e),
            }
        }
        match (held, deleted_any) {
            (_, true) => Ok(()),
            (true, false) => Err(SecretStoreError::ReadOnly),
            (false, false) => Err(SecretStoreError::NotFound(key.to_string())),
        }
    }

    fn get_info(&self, key: &str) -> SecretInfo {
        self.find_store(key)
            .map(|s| SecretInfo::new(true, s.name()))
            .unwrap_or_else(SecretInfo::not_found)
    }
}

impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stores.iter().map(|s| s.name()).collect();
        f.debug_struct("ChainSecretStore")
            .field("stores", &names)
            .field("write_index", &self.write_index)
            .finish()
    }
}
