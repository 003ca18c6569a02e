//! Error types for isolinux configuration and loader staging.

use thiserror::Error;

/// Error type for isolinux operations
#[derive(Debug, Error)]
pub enum Error {
    /// Host architecture has no isolinux support
    #[error("host architecture {0} not supported for isolinux setup")]
    Platform(String),

    /// Template substitution failed
    #[error("template error: {kind}: {message}")]
    Template { kind: String, message: String },

    /// Required copy or command failed while staging loader data
    #[error("loader staging failed: {0}")]
    Staging(String),

    /// Build description could not be read or parsed
    #[error("invalid build description: {0}")]
    Description(String),

    /// I/O error while writing config files or syncing data
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for isolinux operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Platform("aarch64".to_string());
        assert_eq!(
            err.to_string(),
            "host architecture aarch64 not supported for isolinux setup"
        );

        let err = Error::Template {
            kind: "MissingKey".to_string(),
            message: "no value for placeholder 'title'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "template error: MissingKey: no value for placeholder 'title'"
        );

        let err = Error::Staging("gfxboot exited with status 1".to_string());
        assert_eq!(
            err.to_string(),
            "loader staging failed: gfxboot exited with status 1"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
