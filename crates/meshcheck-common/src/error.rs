//! Error types for manifest and snapshot loading
//!
//! Errors carry the resource kind or field involved so a failing manifest can
//! be located without re-reading the input.

use thiserror::Error;

/// Main error type for meshcheck-common operations
#[derive(Debug, Error)]
pub enum Error {
    /// Input was not well-formed YAML
    #[error("yaml error: {message}")]
    Yaml {
        /// Description of the parse failure
        message: String,
    },

    /// A document could not be deserialized into its typed form
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being deserialized (if known)
        kind: Option<String>,
    },

    /// A document parsed but is missing required structure
    #[error("invalid manifest: {message}")]
    InvalidManifest {
        /// Description of what's invalid
        message: String,
        /// The offending field path (e.g., "metadata.name")
        field: Option<String>,
    },
}

impl Error {
    /// Create a YAML parse error
    pub fn yaml(msg: impl Into<String>) -> Self {
        Self::Yaml {
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create an invalid manifest error pointing at a field
    pub fn invalid_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// The resource kind involved, if known
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Serialization { kind, .. } => kind.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_for_keeps_kind() {
        let err = Error::serialization_for("DestinationRule", "missing field `host`");
        assert_eq!(err.kind(), Some("DestinationRule"));
        assert_eq!(
            err.to_string(),
            "serialization error: missing field `host`"
        );
    }

    #[test]
    fn invalid_field_display() {
        let err = Error::invalid_field("metadata.name", "name is required");
        assert_eq!(err.to_string(), "invalid manifest: name is required");
        assert!(err.kind().is_none());
    }

    #[test]
    fn json_errors_convert() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization { kind: None, .. }));
    }
}
