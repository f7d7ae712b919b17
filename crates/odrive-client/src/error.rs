//! Error types for the client crate.

use thiserror::Error;

/// Errors that can occur while talking to a device.
///
/// Only transport and configuration failures are reported here. A reply that
/// times out or fails to parse is not an error: it degrades to partial text or
/// zero, and a state transition that never reaches idle returns `false`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// I/O error on the underlying byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial port could not be opened or configured.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The configuration file could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::InvalidConfig("poll_interval_ms must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: poll_interval_ms must be positive"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "port closed");
        let err: ClientError = io_err.into();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
