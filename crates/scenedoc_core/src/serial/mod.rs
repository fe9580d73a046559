//! The versioned serializer framework.
//!
//! Every document stream starts with a fixed 6-byte header:
//! a 4-byte format signature followed by a little-endian `u16` version.
//! The [`SerializerRegistry`] peeks that header (without consuming it) and
//! dispatches to the concrete serializer registered for the signature.
//!
//! Two formats are built in:
//!
//! - [`EngineSceneSerializer`] (`b"ESCN"`) - the engine's native scene
//!   format: metadata plus the actor tree
//! - [`SceneDocSerializer`] (`b"SDOC"`) - the editor document format, a
//!   superset that wraps the engine serializer and appends components and
//!   path links

mod document;
mod engine;
mod registry;
pub(crate) mod wire;

pub use document::{
    SceneDocSerializer, SCENE_DOC_MAX_VERSION, SCENE_DOC_MIN_VERSION, SCENE_DOC_SIGNATURE,
};
pub use engine::{
    EngineSceneSerializer, ENGINE_SCENE_MAX_VERSION, ENGINE_SCENE_MIN_VERSION,
    ENGINE_SCENE_SIGNATURE,
};
pub use registry::{SerializerDescriptor, SerializerRegistry};

use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult};
use crate::scene::{ActorId, SceneDocument};
use scenedoc_vfs::DocStream;
use std::fmt;
use std::io::SeekFrom;

/// Length of the format signature.
pub const SIGNATURE_LEN: usize = 4;

/// The fixed stream header every format honors.
///
/// Placement at the very start of the stream is part of the public
/// contract: dispatch must never need look-ahead beyond these bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    /// Format signature.
    pub signature: [u8; 4],
    /// Declared document version.
    pub version: u16,
}

impl FormatHeader {
    /// Encoded header length: signature (4) + version (2).
    pub const LEN: usize = SIGNATURE_LEN + 2;

    /// Writes the header at the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream write fails.
    pub fn write(&self, stream: &mut dyn DocStream) -> CoreResult<()> {
        stream.write_all_buf(&self.signature)?;
        stream.write_all_buf(&self.version.to_le_bytes())?;
        Ok(())
    }

    /// Reads and consumes the header at the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is shorter than a header.
    pub fn read(stream: &mut dyn DocStream) -> CoreResult<Self> {
        let mut buf = [0u8; Self::LEN];
        stream
            .read_exact_buf(&mut buf)
            .map_err(|_| CoreError::invalid_format("stream too short for format header"))?;
        Ok(Self {
            signature: [buf[0], buf[1], buf[2], buf[3]],
            version: u16::from_le_bytes([buf[4], buf[5]]),
        })
    }

    /// Reads the header without consuming it: the stream position is
    /// restored before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is shorter than a header or cannot
    /// seek.
    pub fn peek(stream: &mut dyn DocStream) -> CoreResult<Self> {
        let origin = stream.position();
        let header = Self::read(stream);
        stream.seek(SeekFrom::Start(origin))?;
        header
    }
}

/// A recovered condition reported alongside a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A link referenced an actor that no longer exists; the link was
    /// dropped.
    DanglingLink {
        /// Link name.
        name: String,
        /// Source endpoint as stored.
        from: ActorId,
        /// Target endpoint as stored.
        to: ActorId,
    },
    /// An asset referenced by the document did not resolve through the VFS.
    UnresolvedAsset {
        /// The unresolved logical path.
        path: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingLink { name, from, to } => {
                write!(f, "dropped dangling link '{name}' ({from} -> {to})")
            }
            Self::UnresolvedAsset { path } => write!(f, "unresolved asset: {path}"),
        }
    }
}

/// Result of a successful load: the document plus recovered warnings.
#[derive(Debug)]
pub struct LoadOutcome {
    /// The fully constructed document.
    pub document: SceneDocument,
    /// Conditions recovered during the load.
    pub warnings: Vec<LoadWarning>,
}

/// A format-specific reader/writer pair for scene documents.
///
/// Loading is resumable-safe: implementations build into a scratch document
/// and return it only on success, so an error partway through leaves
/// nothing visible to callers. Saving is deterministic: a stable field
/// order makes repeated saves of an unmodified document byte-identical.
pub trait SceneSerializer {
    /// Checks whether this serializer can read its format.
    fn can_load(&self) -> bool {
        true
    }

    /// Checks whether this serializer can write its format.
    fn can_save(&self) -> bool {
        true
    }

    /// Reads a complete document from the stream.
    ///
    /// The cancel token is checked between actors; cancelling mid-load
    /// returns `Cancelled` and discards the scratch document.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed payloads, version mismatches, stream
    /// failures, or cancellation.
    fn load(&self, stream: &mut dyn DocStream, cancel: &CancelToken) -> CoreResult<LoadOutcome>;

    /// Writes a complete document to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error on stream failures or cancellation.
    fn save(
        &self,
        document: &SceneDocument,
        stream: &mut dyn DocStream,
        cancel: &CancelToken,
    ) -> CoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenedoc_vfs::MemoryStream;

    #[test]
    fn header_roundtrip() {
        let header = FormatHeader {
            signature: *b"SDOC",
            version: 3,
        };
        let mut stream = MemoryStream::new();
        header.write(&mut stream).unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(FormatHeader::read(&mut stream).unwrap(), header);
    }

    #[test]
    fn peek_restores_position() {
        let header = FormatHeader {
            signature: *b"ESCN",
            version: 1,
        };
        let mut stream = MemoryStream::new();
        header.write(&mut stream).unwrap();
        stream.write_all_buf(b"payload").unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();

        assert_eq!(FormatHeader::peek(&mut stream).unwrap(), header);
        assert_eq!(stream.position(), 0);
        // a second peek sees the same bytes
        assert_eq!(FormatHeader::peek(&mut stream).unwrap(), header);
    }

    #[test]
    fn short_stream_rejected() {
        let mut stream = MemoryStream::from_vec(vec![1, 2, 3]);
        assert!(matches!(
            FormatHeader::read(&mut stream),
            Err(CoreError::InvalidFormat { .. })
        ));
    }
}
