//! Error types for manifest compilation and path generation

use std::path::PathBuf;
use thiserror::Error;

/// A page filename that cannot be turned into a route
///
/// Always names the offending file (project-root relative). Raised by the
/// segment tokenizer and aborts the whole manifest build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteValidationError {
    #[error("Invalid route {file} - the `$` prefix is no longer supported, use dynamic route params instead")]
    LegacySyntax { file: String },

    #[error("Invalid route {file} - parameters must be separated")]
    UnseparatedParams { file: String },

    #[error("Invalid route {file} - brackets are unbalanced")]
    UnbalancedBrackets { file: String },

    #[error("Invalid route {file} - rest parameter must be a standalone segment")]
    RestNotStandalone { file: String },

    #[error("Invalid route {file} - parameter name must match /^[a-zA-Z_$][a-zA-Z0-9_$]*$/")]
    InvalidParamName { file: String },
}

impl RouteValidationError {
    /// The file that failed validation
    pub fn file(&self) -> &str {
        match self {
            Self::LegacySyntax { file }
            | Self::UnseparatedParams { file }
            | Self::UnbalancedBrackets { file }
            | Self::RestNotStandalone { file }
            | Self::InvalidParamName { file } => file,
        }
    }
}

/// Failure while walking the pages directory
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(transparent)]
    Validation(#[from] RouteValidationError),

    #[error("failed to read pages directory entry {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while turning params back into a pathname
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("missing value for route param `{name}`")]
    MissingParam { name: String },

    #[error("invalid value `{value}` for route param `{name}`: a single segment cannot contain `/`")]
    InvalidParam { name: String, value: String },
}
