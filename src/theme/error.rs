use std::path::PathBuf;

use thiserror::Error;

use super::ValidationReport;

/// Errors that stop a run before anything on the desktop is touched.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("File not found at {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid JSON format in {}: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Theme document must be a JSON object")]
    NotAnObject,

    /// Every missing, non-scalar or malformed required key at once
    #[error("Theme document is not valid: {0}")]
    InvalidDocument(ValidationReport),

    #[error("Invalid value for \"{key}\": {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("An unexpected error occurred: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_document_display() {
        let err = ThemeError::InvalidDocument(ValidationReport {
            missing: vec!["dpi".to_string(), "icon-theme".to_string()],
            ..Default::default()
        });
        assert_eq!(err.to_string(), "Theme document is not valid: missing required keys: dpi, icon-theme");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ThemeError = io_err.into();
        assert!(matches!(err, ThemeError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
