//! Error types for virtual file system operations.

use scenedoc_pack::PackError;
use std::io;
use thiserror::Error;

/// Result type for VFS operations.
pub type VfsResult<T> = Result<T, VfsError>;

/// Errors that can occur during VFS operations.
#[derive(Debug, Error)]
pub enum VfsError {
    /// An I/O error occurred on the underlying medium.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No mounted provider owns the path.
    #[error("path not found: {path}")]
    NotFound {
        /// The unresolved logical path.
        path: String,
    },

    /// The provider owning the path does not support mutation.
    #[error("mount '{label}' is read-only")]
    ReadOnlyMount {
        /// Label of the read-only mount.
        label: String,
    },

    /// The path failed normalization.
    #[error("invalid logical path '{path}': {reason}")]
    InvalidPath {
        /// The offending path text.
        path: String,
        /// Why normalization rejected it.
        reason: String,
    },

    /// The stream was used after `close()`.
    #[error("stream is closed")]
    StreamClosed,

    /// No mount with the given label exists.
    #[error("unknown mount: {label}")]
    UnknownMount {
        /// The requested mount label.
        label: String,
    },

    /// A package-level error (corrupt entry, bad header, ...).
    #[error("package error: {0}")]
    Package(#[from] PackError),
}

impl VfsError {
    /// Creates a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a read-only mount error.
    pub fn read_only(label: impl Into<String>) -> Self {
        Self::ReadOnlyMount {
            label: label.into(),
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
