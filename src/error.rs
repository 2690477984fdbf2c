use std::path::PathBuf;
use thiserror::Error;

/// User-visible error kinds.
///
/// Internal plumbing uses `anyhow`; these variants are the failures callers
/// can act on. The tool layer converts them to `{ "error": ... }` values
/// instead of raising transport-level faults.
#[derive(Debug, Error)]
pub enum RedactError {
    #[error("unsupported file format: .{0}")]
    UnknownFormat(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("session not found or expired: {0}")]
    SessionMissing(String),

    #[error(
        "legacy .doc conversion requires LibreOffice; install it and make sure \
         `soffice` is on PATH"
    )]
    ConverterUnavailable,

    #[error("document could not be opened: {0}")]
    CorruptedDocument(String),

    #[error("invalid pattern `{name}`: {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = RedactError> = std::result::Result<T, E>;
