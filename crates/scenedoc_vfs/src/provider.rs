//! Archive provider trait definition.

use crate::error::{VfsError, VfsResult};
use crate::path::LogicalPath;
use crate::stream::DocStream;

/// A storage backend that resolves logical paths to byte streams.
///
/// Providers are **capability objects**: a folder, an opened package
/// archive, or the rendering engine's native archive all expose the same
/// surface and are mounted interchangeably into the
/// [`VirtualFileSystem`](crate::VirtualFileSystem).
///
/// # Invariants
///
/// - `contains` and `open_read` agree: a contained path opens, an absent
///   path fails `NotFound`
/// - `entries` returns every readable path, normalized
/// - Providers must be `Send + Sync`; `open_read` is safe to call from
///   multiple readers at once
///
/// # Implementors
///
/// - [`super::FolderProvider`] - a plain directory (read/write)
/// - [`super::PackageProvider`] - a package archive (read/write)
/// - [`super::EngineProvider`] - engine-native archive (read-only)
pub trait ArchiveProvider: Send + Sync {
    /// Returns the mount label used in diagnostics and errors.
    fn label(&self) -> &str;

    /// Checks whether this provider owns the path.
    fn contains(&self, path: &LogicalPath) -> bool;

    /// Lists every path this provider can resolve.
    fn entries(&self) -> Vec<LogicalPath>;

    /// Opens a path for reading.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the provider does not own the path, or an I/O
    /// error from the backing medium.
    fn open_read(&self, path: &LogicalPath) -> VfsResult<Box<dyn DocStream>>;

    /// Opens a path for writing.
    ///
    /// The default implementation fails with `ReadOnlyMount`; writable
    /// providers override it.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnlyMount` for read-only providers, or an I/O error from
    /// the backing medium.
    fn open_write(&self, path: &LogicalPath) -> VfsResult<Box<dyn DocStream>> {
        let _ = path;
        Err(VfsError::read_only(self.label()))
    }

    /// Checks whether this provider supports mutation.
    fn writable(&self) -> bool {
        false
    }
}
