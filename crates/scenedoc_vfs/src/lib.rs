//! # Scenedoc VFS
//!
//! Virtual file system for the scenedoc editor.
//!
//! This crate resolves logical resource paths across an ordered stack of
//! archive providers:
//!
//! - [`FolderProvider`] - a plain directory on disk (read/write)
//! - [`PackageProvider`] - an opened package archive (read/write, rebuilds
//!   atomically on write)
//! - [`EngineProvider`] - the rendering engine's native read-only archive,
//!   reached through the [`NativeArchive`] adapter trait
//!
//! ## Design Principles
//!
//! - Providers are capability objects: `contains`, `entries`, `open_read`,
//!   and optionally `open_write`
//! - Resolution is deterministic: higher-priority mounts win, and within a
//!   priority later mounts shadow earlier ones
//! - Streams implement [`DocStream`], the byte-oriented adapter the
//!   serializer framework consumes; closing is idempotent and also happens
//!   on drop, so error paths never leak handles
//!
//! ## Example
//!
//! ```no_run
//! use scenedoc_vfs::{DocStream, FolderProvider, LogicalPath, VirtualFileSystem};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let vfs = VirtualFileSystem::new();
//! let folder = FolderProvider::new("project", Path::new("assets")).unwrap();
//! vfs.mount(Arc::new(folder), 0);
//!
//! let path = LogicalPath::parse("maps/level1.scene").unwrap();
//! let mut stream = vfs.open_read(&path).unwrap();
//! let bytes = stream.read_to_vec().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod folder;
mod package;
mod path;
mod provider;
mod stream;
mod vfs;

pub use engine::{EngineProvider, NativeArchive, StaticArchive};
pub use error::{VfsError, VfsResult};
pub use folder::FolderProvider;
pub use package::PackageProvider;
pub use path::LogicalPath;
pub use provider::ArchiveProvider;
pub use stream::{DocStream, FileStream, MemoryStream, TempFileStream};
pub use vfs::VirtualFileSystem;
