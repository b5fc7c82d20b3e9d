//! Tool domain error types

use thiserror::Error;

/// A malformed tool definition; carries every violation found
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid tool definition: {}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }
}

/// Errors from the durable tool store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt record '{name}': {message}")]
    Corrupt { name: String, message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from registry management operations
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool store error: {0}")]
    Store(#[from] StoreError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_violations() {
        let err = ValidationError::new(vec!["name is required".into(), "url is required".into()]);
        assert_eq!(
            err.to_string(),
            "invalid tool definition: name is required; url is required"
        );
    }

    #[test]
    fn test_registry_error_wraps_validation() {
        let err: RegistryError = ValidationError::new(vec!["bad".into()]).into();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert_eq!(err.to_string(), "invalid tool definition: bad");
    }
}
