//! Error types for the shelf core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SchemaError;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for shelf.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration loading or parsing error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Front-matter could not be read as a field map.
    #[error("Frontmatter error in {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    /// Front-matter was read but does not satisfy its collection schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Validated front-matter could not be decoded into its record type.
    #[error("Decode error in {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new frontmatter error.
    pub fn frontmatter(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Frontmatter {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new decode error.
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldIssue, FieldType, IssueKind};

    #[test]
    fn test_config_error() {
        let err = CoreError::config("missing field");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_frontmatter_error() {
        let err = CoreError::frontmatter("content/posts/hello.md", "unterminated mapping");
        assert!(err.to_string().contains("Frontmatter error"));
        assert!(err.to_string().contains("content/posts/hello.md"));
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let schema_err = SchemaError::new(
            "posts",
            "content/posts/hello.md",
            vec![FieldIssue::new(
                "date",
                IssueKind::Missing {
                    expected: FieldType::Date,
                },
            )],
        );
        let err: CoreError = schema_err.into();
        let msg = err.to_string();
        assert!(msg.contains("posts"));
        assert!(msg.contains("content/posts/hello.md"));
        assert!(msg.contains("date"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }
}
