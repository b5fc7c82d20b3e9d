//! Units of router output

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

/// One piece of an answer
///
/// Serializes as a bare string, or `{"error": "..."}` for the terminal error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fragment {
    Text(String),
    Error { error: String },
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Fragment::Text(text.into())
    }

    pub fn error(error: impl std::fmt::Display) -> Self {
        Fragment::Error {
            error: error.to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Fragment::Text(text) => Some(text),
            Fragment::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Fragment::Error { .. })
    }
}

impl std::fmt::Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fragment::Text(text) => f.write_str(text),
            Fragment::Error { error } => write!(f, "{{\"error\": {:?}}}", error),
        }
    }
}

/// Lazy, pull-driven answer; dropping it stops production
pub type FragmentStream = Pin<Box<dyn Stream<Item = Fragment> + Send>>;
