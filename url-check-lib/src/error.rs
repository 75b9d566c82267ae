//! Error handling for URL checking operations.
//!
//! Per-URL failures are never errors: the dispatcher folds them into a
//! [`StatusValue`](crate::StatusValue). This type only covers conditions
//! outside a single probe, such as unreadable input documents, bad
//! configuration, or a failure to write result sheets.

use std::fmt;

/// Main error type for the library.
#[derive(Debug, Clone)]
pub enum UrlCheckError {
    /// Input document is not a JSON array of model objects
    InvalidDocument {
        source: String,
        reason: String,
    },

    /// JSON parsing errors
    ParseError {
        message: String,
    },

    /// Configuration errors (invalid settings, unparseable files, etc.)
    ConfigError {
        message: String,
    },

    /// File I/O errors when reading documents or writing sheets
    FileError {
        path: String,
        message: String,
    },

    /// HTTP client could not be constructed
    Network {
        message: String,
        source: Option<String>,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl UrlCheckError {
    /// Create a new invalid document error.
    pub fn invalid_document<S: Into<String>, R: Into<String>>(source: S, reason: R) -> Self {
        Self::InvalidDocument {
            source: source.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl fmt::Display for UrlCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDocument { source, reason } => {
                write!(f, "Invalid document '{}': {}", source, reason)
            }
            Self::ParseError { message } => write!(f, "Parse error: {}", message),
            Self::ConfigError { message } => write!(f, "Configuration error: {}", message),
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Network { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for UrlCheckError {}

impl From<reqwest::Error> for UrlCheckError {
    fn from(err: reqwest::Error) -> Self {
        Self::network_with_source("HTTP client error", err.to_string())
    }
}

impl From<serde_json::Error> for UrlCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
        }
    }
}

impl From<std::io::Error> for UrlCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}
