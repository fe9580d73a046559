//! Error types for scene document operations.

use crate::scene::ActorId;
use scenedoc_pack::PackError;
use scenedoc_vfs::VfsError;
use std::io;
use thiserror::Error;

/// Result type for scene document operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while loading, saving, or editing documents.
///
/// Recovered conditions (dangling links, unresolved assets, duplicate
/// package entries) are *not* errors; they surface as
/// [`LoadWarning`](crate::serial::LoadWarning) values next to a successful
/// result.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Virtual file system error.
    #[error("vfs error: {0}")]
    Vfs(#[from] VfsError),

    /// Package codec error.
    #[error("package error: {0}")]
    Pack(#[from] PackError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No registered serializer matches the stream's signature.
    #[error("no serializer for signature {signature:?}")]
    NoMatchingSerializer {
        /// The signature found at the start of the stream.
        signature: [u8; 4],
    },

    /// The document was written by a newer format version than supported.
    #[error("document version {version} is newer than supported maximum {max}")]
    FutureVersion {
        /// The version declared in the stream header.
        version: u16,
        /// The newest version this build can read.
        max: u16,
    },

    /// The document payload is malformed.
    #[error("invalid document format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// An operation referenced an actor that does not exist.
    #[error("actor {id} does not exist in this document")]
    UnknownActor {
        /// The missing actor.
        id: ActorId,
    },

    /// No document is currently open in the session.
    #[error("no document is open")]
    NoDocument,

    /// The open document has never been given a file path.
    #[error("document has no file path")]
    NoDocumentPath,

    /// The operation was cancelled at a checkpoint.
    #[error("operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}
