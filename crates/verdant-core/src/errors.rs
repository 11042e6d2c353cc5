//! Unified error type for Verdant operations.
//!
//! One enum covers every layer: pulls, channel anomalies, validation,
//! and internal invariant breaks. Callers match on the variant when the
//! distinction matters and otherwise propagate with `?`.

use serde::{Deserialize, Serialize};

/// Unified error type for all Verdant operations.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum VerdantError {
    /// Invalid input, e.g. an empty reflection body or a group without a name.
    #[error("Invalid: {message}")]
    Invalid {
        /// What was wrong with the input.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// What was missing.
        message: String,
    },

    /// Network failure on a pull request.
    #[error("Network error: {message}")]
    Network {
        /// Transport-level failure description.
        message: String,
    },

    /// Non-success HTTP response on a pull request.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Serialization or deserialization failure.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Decoder/encoder failure description.
        message: String,
    },

    /// Push channel failure (dispatch loop gone, frame unroutable).
    #[error("Channel error: {message}")]
    Channel {
        /// Channel failure description.
        message: String,
    },

    /// Internal invariant violation.
    #[error("Internal error: {message}")]
    Internal {
        /// Invariant description.
        message: String,
    },
}

impl VerdantError {
    /// Invalid input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Channel error.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }

    /// Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from a pull (fetch) path.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Http { .. })
    }
}

impl From<serde_json::Error> for VerdantError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn constructors_set_variants() {
        assert_matches!(VerdantError::invalid("x"), VerdantError::Invalid { .. });
        assert_matches!(VerdantError::http(500, "boom"), VerdantError::Http { status: 500, .. });
    }

    #[test]
    fn fetch_classification() {
        assert!(VerdantError::network("down").is_fetch());
        assert!(VerdantError::http(404, "missing").is_fetch());
        assert!(!VerdantError::invalid("empty").is_fetch());
    }
}
