//! Unified error type for table purge operations.

/// Errors raised while opening, scanning or deleting from a table.
#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Key schema mismatch: expected hash key '{expected}', table uses '{actual}'")]
    KeySchemaMismatch { expected: String, actual: String },

    #[error("AWS SDK error: {0}")]
    AwsError(String),

    #[error("Malformed item: {0}")]
    MalformedItem(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate
pub type PurgeResult<T> = std::result::Result<T, PurgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_schema_mismatch_message() {
        let err = PurgeError::KeySchemaMismatch {
            expected: "orderId".to_string(),
            actual: "id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Key schema mismatch: expected hash key 'orderId', table uses 'id'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stdin closed");
        let err: PurgeError = io.into();
        assert!(matches!(err, PurgeError::Io(_)));
        assert!(err.to_string().contains("stdin closed"));
    }
}
