//! Error types for Franca IDL parsing

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for Franca IDL parsing
///
/// Only structural failures are errors. Constructs that are simply absent
/// (an interface without broadcasts, an `in` block without parameters) are
/// represented as empty collections instead.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum FidlError {
    #[error("No package declaration found in {}", file.display())]
    MissingPackage { file: PathBuf },

    #[error("No interfaces found in {}, nothing to generate", file.display())]
    NoInterfaces { file: PathBuf },

    #[error("Unbalanced braces at line {line}")]
    UnbalancedBraces { line: usize },

    #[error("Unterminated documentation comment starting at line {line}")]
    UnterminatedComment { line: usize },

    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid {construct} declaration at line {line}: '{text}'")]
    InvalidDeclaration {
        line: usize,
        construct: &'static str,
        text: String,
    },

    #[error("Cannot import {}: {source}", path.display())]
    Import {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for parsing operations
pub type FidlResult<T> = Result<T, FidlError>;

/// Helper function to create `InvalidDeclaration` errors
#[must_use]
pub fn invalid_declaration(line: usize, construct: &'static str, text: &str) -> FidlError {
    FidlError::InvalidDeclaration {
        line,
        construct,
        text: text.trim().to_string(),
    }
}

/// Helper function to create `Import` errors
#[must_use]
pub fn import_error(path: &Path, source: std::io::Error) -> FidlError {
    FidlError::Import {
        path: path.to_path_buf(),
        source,
    }
}

impl FidlError {
    /// Whether the error means the source text itself is malformed, as
    /// opposed to an environment problem such as an unreadable file
    #[must_use]
    pub fn is_malformed_source(&self) -> bool {
        matches!(
            self,
            FidlError::MissingPackage { .. }
                | FidlError::NoInterfaces { .. }
                | FidlError::UnbalancedBraces { .. }
                | FidlError::UnterminatedComment { .. }
                | FidlError::ParseError { .. }
                | FidlError::InvalidDeclaration { .. }
        )
    }
}
