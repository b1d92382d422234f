//! # Error Types
//!
//! Custom error types for DualSense Overlay using `thiserror`.
//!
//! Only the hardware layer and configuration loading fail. The poller never
//! surfaces an error: a failed device read degrades to a disconnected snapshot.

use thiserror::Error;

/// Main error type for DualSense Overlay
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Controller access errors (permissions, read failures)
    #[error("Controller error: {0}")]
    Controller(String),

    /// No DualSense controller attached
    #[error("No DualSense controller found")]
    ControllerNotFound,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DualSense Overlay
pub type Result<T> = std::result::Result<T, OverlayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OverlayError::Controller("permission denied".to_string());
        assert_eq!(err.to_string(), "Controller error: permission denied");
        assert_eq!(
            OverlayError::ControllerNotFound.to_string(),
            "No DualSense controller found"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: OverlayError = io.into();
        assert!(matches!(err, OverlayError::Io(_)));
    }
}
