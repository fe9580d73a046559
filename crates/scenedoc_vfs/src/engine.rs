//! Engine-native archive provider.

use crate::error::{VfsError, VfsResult};
use crate::path::LogicalPath;
use crate::provider::ArchiveProvider;
use crate::stream::{DocStream, MemoryStream};
use std::collections::BTreeMap;
use std::io;

/// The rendering engine's native archive surface.
///
/// The engine exposes its own read-only archive/file interface; this trait
/// is the narrow waist the VFS needs from it, so the subsystem never links
/// against engine types directly. An adapter over the real engine implements
/// this; [`StaticArchive`] is an in-memory implementation for tests and
/// tooling.
pub trait NativeArchive: Send + Sync {
    /// Returns every member name in the archive.
    fn entry_names(&self) -> Vec<String>;

    /// Reads a member's bytes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the member does not exist, or any underlying
    /// I/O error.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// A read-only provider over a [`NativeArchive`].
pub struct EngineProvider {
    label: String,
    archive: Box<dyn NativeArchive>,
}

impl EngineProvider {
    /// Wraps a native archive under a mount label.
    #[must_use]
    pub fn new(label: impl Into<String>, archive: Box<dyn NativeArchive>) -> Self {
        Self {
            label: label.into(),
            archive,
        }
    }
}

impl ArchiveProvider for EngineProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, path: &LogicalPath) -> bool {
        self.archive
            .entry_names()
            .iter()
            .any(|name| matches!(LogicalPath::parse(name), Ok(p) if p == *path))
    }

    fn entries(&self) -> Vec<LogicalPath> {
        self.archive
            .entry_names()
            .iter()
            .filter_map(|name| LogicalPath::parse(name).ok())
            .collect()
    }

    fn open_read(&self, path: &LogicalPath) -> VfsResult<Box<dyn DocStream>> {
        // The native interface is name-keyed; find the stored spelling that
        // matches this logical path.
        let names = self.archive.entry_names();
        let stored = names
            .iter()
            .find(|name| matches!(LogicalPath::parse(name), Ok(p) if p == *path))
            .ok_or_else(|| VfsError::not_found(path.as_str()))?;

        let bytes = self.archive.read(stored).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                VfsError::not_found(path.as_str())
            } else {
                VfsError::Io(e)
            }
        })?;
        Ok(Box::new(MemoryStream::from_vec(bytes)))
    }
}

/// An in-memory [`NativeArchive`] for tests and tooling.
#[derive(Debug, Default)]
pub struct StaticArchive {
    members: BTreeMap<String, Vec<u8>>,
}

impl StaticArchive {
    /// Creates an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member, replacing any previous one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.members.insert(name.into(), data);
    }
}

impl NativeArchive for StaticArchive {
    fn entry_names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.members
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }
}
