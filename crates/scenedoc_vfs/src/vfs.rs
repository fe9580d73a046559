//! The virtual file system: an ordered stack of archive providers.

use crate::error::{VfsError, VfsResult};
use crate::path::LogicalPath;
use crate::provider::ArchiveProvider;
use crate::stream::DocStream;
use parking_lot::Mutex;
use std::sync::Arc;

/// One mounted provider.
struct Mount {
    provider: Arc<dyn ArchiveProvider>,
    priority: i32,
    seq: u64,
}

struct MountTable {
    mounts: Vec<Mount>,
    next_seq: u64,
}

/// Resolves logical paths across an ordered stack of mounted providers.
///
/// Resolution scans mounts from highest priority to lowest; within one
/// priority, later mounts shadow earlier ones. Every lookup returns exactly
/// one owning provider or `NotFound` - no provider is consulted after a
/// match.
///
/// The mount table sits behind a single mutex: topology changes (mount and
/// unmount) serialize against lookups, which snapshot the ordered provider
/// list under the lock and probe providers outside it.
///
/// # Example
///
/// ```no_run
/// use scenedoc_vfs::{FolderProvider, LogicalPath, VirtualFileSystem};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let vfs = VirtualFileSystem::new();
/// let base = FolderProvider::new("base", Path::new("assets")).unwrap();
/// let patch = FolderProvider::new("patch", Path::new("patch")).unwrap();
/// vfs.mount(Arc::new(base), 0);
/// vfs.mount(Arc::new(patch), 10); // shadows base for overlapping paths
/// ```
#[derive(Default)]
pub struct VirtualFileSystem {
    table: Mutex<MountTable>,
}

impl Default for MountTable {
    fn default() -> Self {
        Self {
            mounts: Vec::new(),
            next_seq: 0,
        }
    }
}

impl VirtualFileSystem {
    /// Creates an empty VFS with no mounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a provider at the given priority.
    ///
    /// Higher priority wins; for equal priorities the most recent mount
    /// shadows older ones.
    pub fn mount(&self, provider: Arc<dyn ArchiveProvider>, priority: i32) {
        let mut table = self.table.lock();
        let seq = table.next_seq;
        table.next_seq += 1;
        tracing::debug!(label = provider.label(), priority, "mounting provider");
        table.mounts.push(Mount {
            provider,
            priority,
            seq,
        });
    }

    /// Unmounts the provider with the given label.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMount` if no mount has that label.
    pub fn unmount(&self, label: &str) -> VfsResult<()> {
        let mut table = self.table.lock();
        let before = table.mounts.len();
        table.mounts.retain(|m| m.provider.label() != label);
        if table.mounts.len() == before {
            return Err(VfsError::UnknownMount {
                label: label.to_string(),
            });
        }
        tracing::debug!(label, "unmounted provider");
        Ok(())
    }

    /// Returns the number of active mounts.
    #[must_use]
    pub fn mount_count(&self) -> usize {
        self.table.lock().mounts.len()
    }

    /// Returns the providers in resolution order (highest priority first).
    fn snapshot(&self) -> Vec<Arc<dyn ArchiveProvider>> {
        let table = self.table.lock();
        let mut ordered: Vec<&Mount> = table.mounts.iter().collect();
        ordered.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        ordered.iter().map(|m| Arc::clone(&m.provider)).collect()
    }

    /// Resolves a path to the owning provider.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no mounted provider owns the path.
    pub fn resolve(&self, path: &LogicalPath) -> VfsResult<Arc<dyn ArchiveProvider>> {
        self.snapshot()
            .into_iter()
            .find(|p| p.contains(path))
            .ok_or_else(|| VfsError::not_found(path.as_str()))
    }

    /// Checks whether any mounted provider owns the path.
    #[must_use]
    pub fn exists(&self, path: &LogicalPath) -> bool {
        self.resolve(path).is_ok()
    }

    /// Opens a path for reading through its owning provider.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the path is unresolved, or the provider's open
    /// error.
    pub fn open_read(&self, path: &LogicalPath) -> VfsResult<Box<dyn DocStream>> {
        self.resolve(path)?.open_read(path)
    }

    /// Opens a path for writing.
    ///
    /// If a provider owns the path, the write goes to it and fails with
    /// `ReadOnlyMount` if it cannot mutate. A brand-new path is created in
    /// the highest-priority writable mount.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnlyMount` if the owning provider is read-only, or
    /// `NotFound` when the path is new and no mount is writable.
    pub fn open_write(&self, path: &LogicalPath) -> VfsResult<Box<dyn DocStream>> {
        let providers = self.snapshot();

        if let Some(owner) = providers.iter().find(|p| p.contains(path)) {
            return owner.open_write(path);
        }
        match providers.iter().find(|p| p.writable()) {
            Some(target) => target.open_write(path),
            None => Err(VfsError::not_found(path.as_str())),
        }
    }

    /// Lists every entry under `dir` across all mounts, de-duplicated
    /// case-insensitively with the higher-priority provider winning, in
    /// sorted order.
    #[must_use]
    pub fn list(&self, dir: &LogicalPath) -> Vec<LogicalPath> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for provider in self.snapshot() {
            for entry in provider.entries() {
                if entry.starts_with(dir) && seen.insert(entry.key().to_string()) {
                    out.push(entry);
                }
            }
        }
        out.sort();
        out
    }
}
