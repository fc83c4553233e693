//! Error types for terminology-viewer
//!
//! This module provides the error taxonomy of the loading pipeline:
//! - Stage-specific errors (fetch, decode, parse) that drive the fallback policy
//! - A top-level [`Error`] for configuration and catalog lookups
//! - [`LoadError`], the terminal failure surfaced to callers once every tier is exhausted
//! - Machine-readable error codes for UI integration

use crate::types::LoadStage;
use thiserror::Error;

/// Result type alias for terminology-viewer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for terminology-viewer
///
/// Stage errors convert into this type with `?`, so helpers can propagate any
/// of them uniformly.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "loader.row_cap")
        key: Option<String>,
    },

    /// Network error (bad HTTP status or transport failure)
    #[error("network error: {0}")]
    Fetch(#[from] FetchError),

    /// Neither gzip inflation nor plain-text interpretation produced usable text
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Tokenizer produced no usable rows
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The string could not be turned into a resource locator
    #[error("invalid resource locator: {0}")]
    InvalidLocator(String),

    /// File name is not part of the catalog
    #[error("unknown terminology file: {0}")]
    UnknownFile(String),

    /// Version string is not part of the catalog
    #[error("unknown terminology version: {0}")]
    UnknownVersion(String),
}

impl Error {
    /// Get the machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Fetch(e) => match e {
                FetchError::Status { .. } => "http_status",
                FetchError::Transport { .. } => "transport_error",
                FetchError::ClientBuild(_) => "client_build_error",
            },
            Error::Decode(_) => "decode_error",
            Error::Parse(_) => "parse_error",
            Error::InvalidLocator(_) => "invalid_locator",
            Error::UnknownFile(_) => "unknown_file",
            Error::UnknownVersion(_) => "unknown_version",
        }
    }
}

/// Fetch errors (the `NetworkError` of the pipeline)
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with a status outside the accepted set
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The HTTP status code returned by the server
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Request could not be sent or the body could not be read
    #[error("{message} ({url})")]
    Transport {
        /// The URL that was requested
        url: String,
        /// Description of the transport failure (timeout, connect, body read)
        message: String,
    },

    /// HTTP client could not be constructed
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl FetchError {
    /// HTTP status code, if the failure came from a server response
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Decode errors
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload was empty or whitespace-only
    #[error("payload is empty")]
    Empty,

    /// Both the gzip path and the plain-text path were rejected
    #[error("not gzip ({inflate}) and not CSV text ({plain_text})")]
    Unreadable {
        /// Why gzip inflation did not yield text
        inflate: String,
        /// Why the raw bytes were not accepted as plain text
        plain_text: String,
    },
}

/// Parse errors
#[derive(Debug, Error)]
pub enum ParseError {
    /// Text was empty or whitespace-only
    #[error("CSV file is empty")]
    EmptyInput,

    /// Non-empty text produced zero rows
    #[error("no rows found in the CSV file")]
    NoRows,

    /// The first row had no fields, so no column structure could be derived
    #[error("unable to determine column structure")]
    NoFields,
}

/// Terminal load failure
///
/// Produced once a load reaches the `failed` classification. The reason is a
/// composed, human-readable message naming the stage and the underlying error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct LoadError {
    /// Stage that was active when the load failed
    pub stage: LoadStage,
    /// Human-readable failure reason
    pub reason: String,
}

impl LoadError {
    /// Compose a failure from the stage that failed and the error it raised
    pub fn new(stage: LoadStage, err: &Error) -> Self {
        Self {
            stage,
            reason: format!("{} failed: {}", stage, err),
        }
    }
}
