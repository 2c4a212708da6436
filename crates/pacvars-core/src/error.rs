//! Error types for controller variable access.

use thiserror::Error;

use crate::category::Category;

/// Result type for controller variable operations.
pub type Result<T> = std::result::Result<T, PacError>;

/// Errors raised while resolving, validating or transferring variables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PacError {
    /// A required connection parameter was empty.
    #[error("Blank parameter: {0} must not be empty")]
    BlankParameter(String),

    /// The variable name has no leading lowercase prefix.
    #[error("No prefix in variable name '{0}'")]
    NoPrefix(String),

    /// The leading lowercase run is not a registered prefix.
    #[error("Unknown prefix '{prefix}' in variable name '{name}'")]
    UnknownPrefix { name: String, prefix: String },

    /// Write attempted on a read-only category.
    #[error("Variable '{name}' is read-only ({category})")]
    ReadOnly { name: String, category: Category },

    /// Name not present in the fetched category collection.
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    /// Value failed validation or type casting.
    #[error("Invalid value {value} for '{name}'{}: {reason}", .index.map(|i| format!("[{}]", i)).unwrap_or_default())]
    InvalidValue {
        name: String,
        index: Option<usize>,
        value: String,
        reason: String,
    },

    /// A table was handed to a controller that did not create it.
    #[error("Table '{0}' is not owned by this controller")]
    InvalidTableOwner(String),

    /// The controller answered with a non-success status.
    #[error("{method} {url} failed with status {status}")]
    RemoteError {
        status: u16,
        method: String,
        url: String,
    },

    /// The request never produced a status (connect, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Discriminant of [`PacError`] for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BlankParameter,
    NoPrefix,
    UnknownPrefix,
    ReadOnly,
    UnknownVariable,
    InvalidValue,
    InvalidTableOwner,
    RemoteError,
    Transport,
    Decode,
    Config,
}

impl PacError {
    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PacError::BlankParameter(_) => ErrorKind::BlankParameter,
            PacError::NoPrefix(_) => ErrorKind::NoPrefix,
            PacError::UnknownPrefix { .. } => ErrorKind::UnknownPrefix,
            PacError::ReadOnly { .. } => ErrorKind::ReadOnly,
            PacError::UnknownVariable(_) => ErrorKind::UnknownVariable,
            PacError::InvalidValue { .. } => ErrorKind::InvalidValue,
            PacError::InvalidTableOwner(_) => ErrorKind::InvalidTableOwner,
            PacError::RemoteError { .. } => ErrorKind::RemoteError,
            PacError::Transport(_) => ErrorKind::Transport,
            PacError::Decode(_) => ErrorKind::Decode,
            PacError::Config(_) => ErrorKind::Config,
        }
    }

    /// Shorthand for a scalar validation failure.
    pub fn invalid(name: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        PacError::InvalidValue {
            name: name.to_string(),
            index: None,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach a table index to a validation failure.
    pub fn at_index(self, i: usize) -> Self {
        match self {
            PacError::InvalidValue {
                name,
                value,
                reason,
                ..
            } => PacError::InvalidValue {
                name,
                index: Some(i),
                value,
                reason,
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for PacError {
    fn from(e: serde_json::Error) -> Self {
        PacError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display_names_index() {
        let err = PacError::invalid("itCounts", "1.5", "not an integer").at_index(2);
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        let msg = err.to_string();
        assert!(msg.contains("itCounts[2]"));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn test_remote_error_display() {
        let err = PacError::RemoteError {
            status: 404,
            method: "GET".to_string(),
            url: "https://pac/api/v1/device/strategy/vars/int32s".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GET https://pac/api/v1/device/strategy/vars/int32s failed with status 404"
        );
    }
}
