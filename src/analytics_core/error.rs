//! Engine error taxonomy
//!
//! Configuration and data errors abort a single category (or a single
//! composite) and carry the category name when one applies. An undefined
//! divergence is not an error, see [`super::types::Divergence`].

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Weight/score cardinality mismatch, malformed epsilon, bad weights.
    Configuration(String),
    /// Empty or non-finite observations, misaligned sequences, out-of-order snapshots.
    Data {
        category: Option<String>,
        reason: String,
    },
}

impl EngineError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        EngineError::Configuration(reason.into())
    }

    pub fn data(reason: impl Into<String>) -> Self {
        EngineError::Data {
            category: None,
            reason: reason.into(),
        }
    }

    pub fn data_in(category: &str, reason: impl Into<String>) -> Self {
        EngineError::Data {
            category: Some(category.to_string()),
            reason: reason.into(),
        }
    }

    /// Attach a category name to a data error that does not carry one yet
    pub fn in_category(self, name: &str) -> Self {
        match self {
            EngineError::Data {
                category: None,
                reason,
            } => EngineError::Data {
                category: Some(name.to_string()),
                reason,
            },
            other => other,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }

    pub fn is_data(&self) -> bool {
        matches!(self, EngineError::Data { .. })
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            EngineError::Data { category, .. } => category.as_deref(),
            EngineError::Configuration(_) => None,
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            EngineError::Data {
                category: Some(category),
                reason,
            } => write!(f, "Data error in {}: {}", category, reason),
            EngineError::Data {
                category: None,
                reason,
            } => write!(f, "Data error: {}", reason),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<crate::config::ConfigError> for EngineError {
    fn from(err: crate::config::ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

impl Serialize for EngineError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
