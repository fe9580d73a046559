//! Error types for package operations.

use std::io;
use thiserror::Error;

/// Result type for package operations.
pub type PackResult<T> = Result<T, PackError>;

/// Errors that can occur while reading or writing packages.
///
/// Duplicate entry names are deliberately *not* an error: historically
/// produced archives contain them, so the reader keeps the last occurrence
/// and reports the collision as a warning instead.
#[derive(Debug, Error)]
pub enum PackError {
    /// An I/O error occurred on the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The package header or index is malformed.
    #[error("invalid package format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// The package was written by an unsupported format version.
    #[error("unsupported package version {version} (supported {min}..={max})")]
    UnsupportedVersion {
        /// The version declared in the header.
        version: u16,
        /// Oldest supported version.
        min: u16,
        /// Newest supported version.
        max: u16,
    },

    /// A single member failed checksum or decompression.
    ///
    /// The archive itself stays open; only this read fails.
    #[error("corrupt entry '{name}': {reason}")]
    CorruptEntry {
        /// Name of the corrupt member.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// No member with the requested name exists in the index.
    #[error("entry not found: {name}")]
    EntryNotFound {
        /// The requested member name.
        name: String,
    },
}

impl PackError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a corrupt entry error.
    pub fn corrupt_entry(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptEntry {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an entry not found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }
}
