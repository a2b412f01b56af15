//! All error types for the respack crate.
//!
//! Only I/O-layer failures are fatal; structural problems in individual
//! files, archive members, or header columns are reported through the event
//! channel and the offending unit is skipped.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("tabular parse error: {0}")]
    Tabular(#[from] csv::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("module `{0}` has no filesystem anchor")]
    UnanchoredModule(String),

    #[error("unsupported package format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_display() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_config_error_display() {
        let error = Error::config("separator must be ASCII");
        assert_eq!(
            error.to_string(),
            "invalid configuration: separator must be ASCII"
        );
    }

    #[test]
    fn test_unanchored_module_display() {
        let error = Error::UnanchoredModule("app_storefront".to_string());
        assert_eq!(
            error.to_string(),
            "module `app_storefront` has no filesystem anchor"
        );
    }

    #[test]
    fn test_unsupported_format_display() {
        let error = Error::UnsupportedFormat("json".to_string());
        assert!(error.to_string().contains("json"));
    }
}
