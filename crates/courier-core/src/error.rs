// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the courier workspace.

use thiserror::Error;

/// The primary error type used across courier traits and operations.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Configuration errors (invalid TOML, bad values, unknown keys).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistent store errors (connection, query, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Delivery errors reported by the dispatcher (network failure,
    /// non-success response).
    #[error("dispatch error: {message}")]
    Dispatch {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The referenced message is not in the queue.
    #[error("message not found: {id}")]
    NotFound { id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CourierError {
    /// Shorthand for a dispatch failure with no underlying source.
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error as a storage failure.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// The failure text recorded on a message after an attempt fails.
    ///
    /// Dispatch failures keep their reason verbatim, without the
    /// `dispatch error:` display prefix; other variants fall back to
    /// their display form.
    pub fn attempt_message(&self) -> String {
        match self {
            Self::Dispatch { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let err = CourierError::Config("missing endpoint url".to_string());
        assert_eq!(err.to_string(), "configuration error: missing endpoint url");

        let err = CourierError::NotFound {
            id: "abc-123".to_string(),
        };
        assert_eq!(err.to_string(), "message not found: abc-123");
    }

    #[test]
    fn attempt_message_strips_dispatch_prefix() {
        let err = CourierError::dispatch("connection refused");
        assert_eq!(err.to_string(), "dispatch error: connection refused");
        assert_eq!(err.attempt_message(), "connection refused");
    }

    #[test]
    fn attempt_message_keeps_other_variants_verbatim() {
        let err = CourierError::Internal("poisoned state".to_string());
        assert_eq!(err.attempt_message(), "internal error: poisoned state");
    }

    #[test]
    fn storage_wraps_source() {
        let io = std::io::Error::other("disk full");
        let err = CourierError::storage(io);
        assert_eq!(err.to_string(), "storage error: disk full");
    }
}
