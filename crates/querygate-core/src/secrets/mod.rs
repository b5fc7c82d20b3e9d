//! Secret storage for generator credentials
//!
//! - `SecretStore` trait
//! - `EnvSecretStore`, `MemorySecretStore`, `KeychainSecretStore`, `ChainSecretStore`
//!
//! Resolution order for the generator's API key: an explicit key from config,
//! then environment variables, then the system keychain.

mod chain_store;
mod env_store;
mod keychain_store;
mod memory_store;
mod traits;

use std::sync::Arc;

pub use chain_store::ChainSecretStore;
pub use env_store::EnvSecretStore;
pub use keychain_store::KeychainSecretStore;
pub use memory_store::MemorySecretStore;
pub use traits::{SecretInfo, SecretStore, SecretStoreError, SecretStoreResult};

/// env -> keychain
pub fn default_chain() -> ChainSecretStore {
    ChainSecretStore::new(vec![
        Arc::new(EnvSecretStore::new()),
        Arc::new(KeychainSecretStore::new()),
    ])
}

/// Explicit key wins; otherwise look the provider id up in `store`
pub fn resolve_api_key(
    explicit: Option<&str>,
    provider: &str,
    store: &dyn SecretStore,
) -> Option<String> {
    match explicit {
        Some(key) if !key.is_empty() => Some(key.to_string()),
        _ => store.get(provider),
    }
}
