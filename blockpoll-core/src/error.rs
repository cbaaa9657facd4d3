//! Error types for the blockpoll core crate.

use std::fmt;

/// Top-level error type for blockpoll-core operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Serialization or deserialization failed.
    Serialization(SerializationError),
    /// A block locator must carry at least one hash.
    EmptyLocator,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Serialization(e) => write!(f, "serialization error: {}", e),
            CoreError::EmptyLocator => write!(f, "block locator is empty"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<SerializationError> for CoreError {
    fn from(e: SerializationError) -> Self {
        CoreError::Serialization(e)
    }
}

/// Errors related to serialization and deserialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to encode data to bytes.
    EncodeFailed(String),
    /// Failed to decode data from bytes.
    DecodeFailed(String),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::EncodeFailed(msg) => write!(f, "encode failed: {}", msg),
            SerializationError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
        }
    }
}

impl std::error::Error for SerializationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = CoreError::EmptyLocator;
        assert_eq!(e.to_string(), "block locator is empty");

        let e = CoreError::Serialization(SerializationError::DecodeFailed("eof".into()));
        assert!(e.to_string().contains("decode failed: eof"));
    }

    #[test]
    fn test_error_conversion() {
        let err: CoreError = SerializationError::EncodeFailed("x".into()).into();
        assert!(matches!(err, CoreError::Serialization(SerializationError::EncodeFailed(_))));
    }
}
