//! Error types and handling
//!
//! Decoding a manifest can fail in exactly two ways (see [`DecodeError`]).
//! Loading one from disk adds the usual I/O and lookup failures on top, and
//! everything is wrapped in [`ManifestError`] for unified handling.

use thiserror::Error;

/// Message emitted by the shorthand decoders when a field has a shape they
/// do not accept. [`DecodeError::from_json`] keys off this text.
pub const UNSUPPORTED_TYPE: &str = "unsupported type";

/// Failure to turn raw bytes into a [`Manifest`](crate::manifest::Manifest).
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Malformed JSON, or a fixed-shape field holding the wrong JSON type.
    ///
    /// Both come straight from `serde_json` and are passed through unchanged.
    #[error("Failed to parse manifest: {0}")]
    Syntax(#[source] serde_json::Error),

    /// A shorthand field (string-or-list, string-or-int-or-list, port
    /// specifier) received a JSON value of a shape it cannot normalize.
    #[error("{UNSUPPORTED_TYPE} at line {line} column {column}")]
    UnsupportedType { line: usize, column: usize },
}

impl DecodeError {
    /// Classify a `serde_json` error into one of the two decode kinds.
    pub fn from_json(err: serde_json::Error) -> Self {
        if err.is_data() && err.to_string().starts_with(UNSUPPORTED_TYPE) {
            DecodeError::UnsupportedType {
                line: err.line(),
                column: err.column(),
            }
        } else {
            DecodeError::Syntax(err)
        }
    }

    /// Whether this is the unsupported-type kind.
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, DecodeError::UnsupportedType { .. })
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Manifest bytes could not be decoded
    #[error("Failed to decode manifest: {0}")]
    Decode(#[from] DecodeError),

    /// Manifest value failed a validation rule
    #[error("Configuration validation error: {message}")]
    Validation { message: String },

    /// Manifest file I/O error
    #[error("Failed to read manifest file")]
    Io(#[from] std::io::Error),

    /// Manifest file not found
    #[error("Manifest file not found: {path}")]
    NotFound { path: String },
}

/// Main error enum wrapping all domain-specific errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<DecodeError> for ManifestError {
    fn from(err: DecodeError) -> Self {
        ManifestError::Config(ConfigError::Decode(err))
    }
}

/// Convenience type alias for Results with ManifestError
pub type Result<T> = std::result::Result<T, ManifestError>;
