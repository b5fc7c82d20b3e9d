//! Secret store trait

use thiserror::Error;

/// Where a secret was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretInfo {
    pub available: bool,
    /// Store that holds the secret (useful behind a chain)
    pub source: String,
}

impl SecretInfo {
    pub fn new(available: bool, source: impl Into<String>) -> Self {
        Self {
            available,
            source: source.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(false, "none")
    }
}

#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store is read-only")]
    ReadOnly,

    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Store not available: {0}")]
    NotAvailable(String),

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Key/value secret storage used for generator credentials
///
/// Keys are either provider ids (`openai`) or literal variable names
/// (`OPENAI_API_KEY`); each store decides how to map them.
pub trait SecretStore: Send + Sync {
    fn name(&self) -> &str;

    /// A keychain store is unavailable on a headless box, for instance
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Option<String>;

    /// `Err(ReadOnly)` for stores that cannot write
    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    fn delete(&self, key: &str) -> SecretStoreResult<()>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get_info(&self, key: &str) -> SecretInfo {
        if self.has(key) {
            SecretInfo::new(true, self.name())
        } else {
            SecretInfo::not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_info() {
        let info = SecretInfo::new(true, "env");
        assert!(info.available);
        assert_eq!(info.source, "env");

        let missing = SecretInfo::not_found();
        assert!(!missing.available);
        assert_eq!(missing.source, "none");
    }
}
