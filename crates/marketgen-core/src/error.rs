use std::path::PathBuf;

use thiserror::Error;

/// Canonical error type for generation, reconciliation and verification.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A single partition could not be generated or persisted.
    #[error("partition {partition} failed: {message}")]
    Partition {
        /// 1-based partition index.
        partition: usize,
        /// Human-readable cause.
        message: String,
    },

    /// The base catalog could not be read or written.
    #[error("catalog file `{}` failed: {message}", path.display())]
    Catalog {
        /// Catalog artifact involved.
        path: PathBuf,
        /// Human-readable cause.
        message: String,
    },

    /// Configuration rejected before any work started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Layered configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Unexpected internal error occurred.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable details for debugging purposes.
        message: String,
    },

    /// I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error occurred.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error occurred.
    #[error("deserialization error: {0}")]
    DeserializationError(String),
}

impl CoreError {
    /// Creates a `Partition` variant.
    #[must_use]
    pub fn partition(partition: usize, message: impl Into<String>) -> Self {
        Self::Partition {
            partition,
            message: message.into(),
        }
    }

    /// Creates a `Catalog` variant.
    #[must_use]
    pub fn catalog(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Catalog {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an `InvalidConfig` variant.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Creates an `Internal` variant.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::IoError(err.into())
        } else if err.is_eof() || err.is_syntax() {
            Self::DeserializationError(err.to_string())
        } else {
            Self::SerializationError(err.to_string())
        }
    }
}

/// Convenient result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_errors_map_to_deserialization() {
        let err = serde_json::from_str::<serde_json::Value>("[1, 2").unwrap_err();
        assert!(matches!(
            CoreError::from(err),
            CoreError::DeserializationError(_)
        ));
    }

    #[test]
    fn test_writer_failures_keep_io_kind() {
        struct Full;

        impl std::io::Write for Full {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = serde_json::to_writer(Full, &vec![1, 2, 3]).unwrap_err();
        match CoreError::from(err) {
            CoreError::IoError(io) => assert!(io.to_string().contains("no space left")),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }

    #[test]
    fn test_partition_error_display() {
        let err = CoreError::partition(2, "disk full");
        assert_eq!(err.to_string(), "partition 2 failed: disk full");
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CoreError::catalog("out/vendors.json", "permission denied");
        assert_eq!(
            err.to_string(),
            "catalog file `out/vendors.json` failed: permission denied"
        );
    }
}
