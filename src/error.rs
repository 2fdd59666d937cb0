//! Error types for cabinet.

use thiserror::Error;

/// Common error type for cabinet.
#[derive(Error, Debug)]
pub enum CabinetError {
    /// Database error.
    ///
    /// Wraps errors from the database backend. sqlx errors are converted
    /// automatically; unique-constraint violations become [`CabinetError::Conflict`].
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Conflicting state, e.g. a sibling name collision or a cyclic move.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Archive packaging error.
    #[error("archive error: {0}")]
    Archive(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for CabinetError {
    fn from(e: sqlx::Error) -> Self {
        let msg = e.to_string();
        // Uniqueness constraints back the sibling-name invariant; surface them
        // as Conflict so the web layer can answer 409.
        if msg.contains("UNIQUE constraint failed") {
            CabinetError::Conflict("name already exists".to_string())
        } else {
            CabinetError::Database(msg)
        }
    }
}

/// Result type alias for cabinet operations.
pub type Result<T> = std::result::Result<T, CabinetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = CabinetError::Auth("invalid password".to_string());
        assert_eq!(err.to_string(), "authentication error: invalid password");
    }

    #[test]
    fn test_validation_error_display() {
        let err = CabinetError::Validation("name too long".to_string());
        assert_eq!(err.to_string(), "validation error: name too long");
    }

    #[test]
    fn test_conflict_error_display() {
        let err = CabinetError::Conflict("sibling name taken".to_string());
        assert_eq!(err.to_string(), "conflict: sibling name taken");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = CabinetError::NotFound("file".to_string());
        assert_eq!(err.to_string(), "file not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CabinetError = io_err.into();
        assert!(matches!(err, CabinetError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(CabinetError::Auth("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
